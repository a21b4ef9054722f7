//! a line oriented command dispatcher over one container
use byte_unit::Byte;
use log::debug;
use std::io::{BufRead, Write};
use thiserror::Error;

use crate::fs::{FileStorage, FsError, Image};

const HELP: &[&str] = &[
    "ls <dir>              list a directory",
    "mkdir <path>          create a directory and its missing parents",
    "write <path> <text>   replace the content of a file",
    "touch <path>          create or empty a file",
    "cat <path>            print a file",
    "rm <path>             remove a file",
    "rmdir <path>          remove an empty directory",
    "stat <path>           describe a file or directory",
    "df                    show free blocks and inodes",
    "link <src> <dst>      not supported, hard links are not implemented",
    "help                  show this text",
    "quit                  leave the shell",
];

/// why a single command failed, the shell keeps going afterwards
#[derive(Error, Debug)]
enum CommandError {
    #[error(transparent)]
    Fs(#[from] FsError),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0} is not supported")]
    Unsupported(&'static str),
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
}

enum Reply {
    Lines(Vec<String>),
    Quit,
}

/// split off the first whitespace separated word
fn next_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    s.split_once(char::is_whitespace).unwrap_or((s, ""))
}

fn required<'a>(word: &'a str, usage: &'static str) -> Result<&'a str, CommandError> {
    if word.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    Ok(word)
}

fn human(bytes: u64) -> String {
    Byte::from_bytes(bytes as _)
        .get_appropriate_unit(true)
        .to_string()
}

pub struct Shell<I: Image> {
    fs: FileStorage<I>,
    max_entries: usize,
}

impl<I: Image> Shell<I> {
    /// `max_entries` caps how many names `ls` prints
    pub fn new(fs: FileStorage<I>, max_entries: usize) -> Self {
        Shell { fs, max_entries }
    }

    pub fn storage(&self) -> &FileStorage<I> {
        &self.fs
    }

    /// execute every line of `input` until it ends or a `quit` is read
    pub fn run<R, W>(&mut self, input: R, out: &mut W) -> anyhow::Result<()>
    where
        R: BufRead,
        W: Write,
    {
        for line in input.lines() {
            if !self.execute(&line?, out)? {
                break;
            }
        }
        out.flush()?;
        Ok(())
    }

    /// execute one command line, printing its result or its error to `out`
    /// # Return
    /// `false` once the shell should stop
    pub fn execute<W>(&mut self, line: &str, out: &mut W) -> anyhow::Result<bool>
    where
        W: Write,
    {
        let (command, args) = next_word(line);
        if command.is_empty() {
            return Ok(true);
        }
        debug!("shell command {command:?}");
        match self.dispatch(command, args) {
            Ok(Reply::Lines(lines)) => {
                for line in lines {
                    writeln!(out, "{line}")?;
                }
                Ok(true)
            }
            Ok(Reply::Quit) => Ok(false),
            Err(e) => {
                writeln!(out, "error: {e}")?;
                Ok(true)
            }
        }
    }

    fn dispatch(&mut self, command: &str, args: &str) -> Result<Reply, CommandError> {
        let (path, rest) = next_word(args);
        let lines = match command {
            "ls" => {
                let path = required(path, "ls <dir>")?;
                vec![self.fs.ls(path, self.max_entries)?.join(" ")]
            }
            "mkdir" => {
                self.fs.mkdir(required(path, "mkdir <path>")?)?;
                vec![]
            }
            "write" => {
                // text starts at its first non-blank character, inner blanks are kept
                let path = required(path, "write <path> <text>")?;
                self.fs.set_file_contents(path, rest.trim_start().as_bytes())?;
                vec![]
            }
            "touch" => {
                self.fs.set_file_contents(required(path, "touch <path>")?, b"")?;
                vec![]
            }
            "cat" => {
                let content = self.fs.cat(required(path, "cat <path>")?)?;
                vec![String::from_utf8_lossy(&content).into_owned()]
            }
            "rm" => {
                self.fs.rm(required(path, "rm <path>")?)?;
                vec![]
            }
            "rmdir" => {
                self.fs.rmdir(required(path, "rmdir <path>")?)?;
                vec![]
            }
            "stat" => {
                let meta = self.fs.stat(required(path, "stat <path>")?)?;
                vec![
                    format!("inode: {}", meta.inode_id),
                    format!("kind: {:?}", meta.kind),
                    format!("size: {}", meta.size),
                    format!("links: {}", meta.link_count),
                    format!("blocks: {:?}", meta.blocks),
                ]
            }
            "df" => {
                let usage = self.fs.usage();
                let block_size = usage.block_size as u64;
                vec![
                    format!(
                        "blocks: {} free of {} ({} of {})",
                        usage.free_blocks,
                        usage.total_blocks,
                        human(usage.free_blocks as u64 * block_size),
                        human(usage.total_blocks as u64 * block_size),
                    ),
                    format!(
                        "inodes: {} free of {}",
                        usage.free_inodes, usage.total_inodes
                    ),
                ]
            }
            "link" => return Err(CommandError::Unsupported("link")),
            "help" => HELP.iter().map(|line| line.to_string()).collect(),
            "quit" | "exit" => return Ok(Reply::Quit),
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Reply::Lines(lines))
    }
}
