use std::path::Path;
use std::process::Command;

use dismantle::{dismantle, Config, PixelGrid, Texture};

fn exe() -> &'static str {
    env!("CARGO_BIN_EXE_dismantle")
}

fn pattern(width: usize, height: usize) -> Vec<u8> {
    (0..width * height * 4).map(|i| (i * 7 % 251) as u8).collect()
}

fn write_glt(path: &Path, width: usize, height: usize) {
    Texture::new(width, height, pattern(width, height))
        .store(path)
        .unwrap();
}

#[test]
fn missing_arguments_exit_3() {
    let status = Command::new(exe()).arg("only-input.glt").status().unwrap();
    assert_eq!(status.code(), Some(3));

    let status = Command::new(exe()).status().unwrap();
    assert_eq!(status.code(), Some(3));
}

#[test]
fn glt_matches_library() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.glt");
    let output = dir.path().join("out.glt");
    write_glt(&input, 12, 9);

    let status = Command::new(exe())
        .arg(&input)
        .arg("cli key")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let mut expected = pattern(12, 9);
    let mut grid = PixelGrid::new(&mut expected, 12, 9).unwrap();
    dismantle(&mut grid, "cli key", &Config::default()).unwrap();

    assert_eq!(Texture::load(&output).unwrap().data, expected);
}

#[test]
fn png_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.glt");
    let output = dir.path().join("out.png");
    write_glt(&input, 10, 7);

    let status = Command::new(exe())
        .arg("--fast")
        .arg(&input)
        .arg("k")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let im = image::open(&output).unwrap().into_rgba8();
    assert_eq!((im.width(), im.height()), (10, 7));
}

#[test]
fn fast_and_complex_conflict() {
    let status = Command::new(exe())
        .args(["-f", "-c", "a.glt", "k", "b.glt"])
        .status()
        .unwrap();
    assert!(!status.success());
}
