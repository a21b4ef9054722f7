use flatfs::{FileKind, FileStorage, FsError, MemoryImage, MAX_FILE_BYTES, MAX_INODES};

fn formatted(capacity: u64) -> FileStorage<MemoryImage> {
    FileStorage::format(MemoryImage::new(), capacity).expect("format failed")
}

/// content unique to `seed`, so mixed up blocks show up as mismatches
fn pattern(seed: usize, len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 7 + seed * 13) % 256) as u8).collect()
}

#[test]
fn test_end_to_end_scenario() -> anyhow::Result<()> {
    let mut fs = formatted(131072);
    assert_eq!(fs.superblock().block_count, 128);

    fs.mkdir("/a")?;
    fs.mkdir("/a/b")?;
    fs.set_file_contents("/a/b/f.txt", b"hello")?;
    assert_eq!(fs.cat("/a/b/f.txt")?, b"hello");
    // the terminator byte is part of the logical size
    assert_eq!(fs.stat("/a/b/f.txt")?.size, 6);
    assert_eq!(fs.ls("/a", 50)?, vec!["b"]);

    fs.rm("/a/b/f.txt")?;
    assert!(fs.ls("/a/b", 50)?.is_empty());
    Ok(())
}

#[test]
fn test_round_trip_at_many_sizes() -> anyhow::Result<()> {
    let mut fs = formatted(131072);
    for (i, len) in [0, 1, 1023, 1024, 1025, 5000, MAX_FILE_BYTES]
        .into_iter()
        .enumerate()
    {
        let path = format!("/sizes/f{i}");
        let content = pattern(i, len);
        fs.set_file_contents(&path, &content)?;
        assert_eq!(fs.cat(&path)?, content, "length {len}");
    }
    // rewriting with a smaller and then a larger content
    fs.set_file_contents("/sizes/f6", b"tiny")?;
    assert_eq!(fs.cat("/sizes/f6")?, b"tiny");
    fs.set_file_contents("/sizes/f6", &pattern(99, 3000))?;
    assert_eq!(fs.cat("/sizes/f6")?, pattern(99, 3000));
    Ok(())
}

#[test]
fn test_idempotent_mkdir() -> anyhow::Result<()> {
    let mut fs = formatted(131072);
    fs.mkdir("/x/y/z")?;
    let usage = fs.usage();
    fs.mkdir("/x/y/z")?;
    fs.mkdir("/x/y/z")?;
    fs.mkdir("/x/y")?;
    assert_eq!(fs.usage(), usage);
    assert_eq!(fs.ls("/", 50)?, vec!["x"]);
    assert_eq!(fs.ls("/x", 50)?, vec!["y"]);
    assert_eq!(fs.ls("/x/y", 50)?, vec!["z"]);
    Ok(())
}

#[test]
fn test_empty_after_create() -> anyhow::Result<()> {
    let mut fs = formatted(131072);
    fs.mkdir("/fresh")?;
    for n in [0, 1, 50, 1000] {
        assert!(fs.ls("/fresh", n)?.is_empty());
    }
    assert_eq!(fs.stat("/fresh")?.kind, FileKind::Directory);
    Ok(())
}

#[test]
fn test_rm_absent_file() -> anyhow::Result<()> {
    let mut fs = formatted(131072);
    assert!(matches!(fs.rm("/nothing"), Err(FsError::NotFound(_))));
    assert!(matches!(fs.rm("/no/parent"), Err(FsError::NotFound(_))));
    fs.set_file_contents("/once", b"1")?;
    fs.rm("/once")?;
    assert!(matches!(fs.rm("/once"), Err(FsError::NotFound(_))));
    Ok(())
}

#[test]
fn test_rmdir_non_empty_keeps_contents() -> anyhow::Result<()> {
    let mut fs = formatted(131072);
    fs.set_file_contents("/keep/inner/data", b"still here")?;
    assert!(matches!(
        fs.rmdir("/keep"),
        Err(FsError::DirectoryNotEmpty(_))
    ));
    assert!(matches!(
        fs.rmdir("/keep/inner"),
        Err(FsError::DirectoryNotEmpty(_))
    ));
    assert_eq!(fs.ls("/keep", 50)?, vec!["inner"]);
    assert_eq!(fs.cat("/keep/inner/data")?, b"still here");
    Ok(())
}

#[test]
fn test_rmdir_root() -> anyhow::Result<()> {
    let mut fs = formatted(131072);
    assert!(matches!(fs.rmdir("/"), Err(FsError::IllegalRootRemoval)));
    fs.mkdir("/child")?;
    assert!(matches!(fs.rmdir("/"), Err(FsError::IllegalRootRemoval)));
    Ok(())
}

#[test]
fn test_block_exhaustion_is_safe() -> anyhow::Result<()> {
    let mut fs = formatted(131072);
    let mut written = Vec::new();
    let err = loop {
        let i = written.len();
        let path = format!("/big{i}");
        match fs.set_file_contents(&path, &pattern(i, MAX_FILE_BYTES)) {
            Ok(()) => written.push(path),
            Err(e) => break e,
        }
    };
    assert!(matches!(err, FsError::StorageExhausted("blocks")));
    // 125 free blocks hold ten files of twelve blocks each
    assert_eq!(written.len(), 10);

    let usage = fs.usage();
    assert!(fs.set_file_contents("/late", &pattern(0, 6000)).is_err());
    assert_eq!(fs.usage(), usage);
    for (i, path) in written.iter().enumerate() {
        assert_eq!(fs.cat(path)?, pattern(i, MAX_FILE_BYTES));
    }
    assert_eq!(fs.ls("/", 50)?.len(), written.len());
    Ok(())
}

#[test]
fn test_inode_exhaustion_is_safe() -> anyhow::Result<()> {
    let mut fs = formatted(64 * 1024);
    for i in 1..MAX_INODES {
        fs.set_file_contents(&format!("/f{i}"), format!("file {i}").as_bytes())?;
    }
    assert!(matches!(
        fs.mkdir("/one/more"),
        Err(FsError::StorageExhausted("inodes"))
    ));
    assert!(matches!(
        fs.set_file_contents("/g", b"x"),
        Err(FsError::StorageExhausted("inodes"))
    ));
    assert_eq!(fs.usage().free_inodes, 0);
    for i in 1..MAX_INODES {
        assert_eq!(fs.cat(&format!("/f{i}"))?, format!("file {i}").as_bytes());
    }

    // removing one file makes room again
    fs.rm("/f1")?;
    fs.set_file_contents("/g", b"x")?;
    assert_eq!(fs.cat("/g")?, b"x");
    Ok(())
}

#[test]
fn test_malformed_paths() {
    let mut fs = formatted(131072);
    for path in ["", "a", "/a//b", "/a/", "/abcdefghijklmn"] {
        assert!(
            matches!(fs.mkdir(path), Err(FsError::MalformedPath { .. })),
            "{path:?} should be rejected"
        );
    }
    assert!(fs.mkdir("/abcdefghijklm").is_ok());
}

#[test]
fn test_file_too_large() {
    let mut fs = formatted(131072);
    let usage = fs.usage();
    assert!(matches!(
        fs.set_file_contents("/huge", &vec![0u8; MAX_FILE_BYTES + 1]),
        Err(FsError::FileTooLarge { .. })
    ));
    assert_eq!(fs.usage(), usage);
}
