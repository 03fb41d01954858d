//! Main Program for Dismantle
//! Run with `--help` for more instruction

// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context as _, Error};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use image::io::Reader as ImageReader;
use image::{save_buffer, ColorType};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dismantle::{dismantle, Complexity, Config, Texture};

/// Exit code for missing positional arguments.
const USAGE_EXIT: u8 = 3;

#[derive(Parser, Debug)]
#[command(author, version)]
struct Args {
    /// Input file (GLT texture by `.glt` extension, any common image otherwise)
    input: PathBuf,

    /// Key
    key: String,

    /// Output file (format picked by extension, like input)
    output: PathBuf,

    /// Light generators for both key schedule and color shift
    #[arg(short = 'f', long, conflicts_with = "complex")]
    fast: bool,

    /// Heavy generators for both key schedule and color shift
    #[arg(short = 'c', long)]
    complex: bool,
}

impl Args {
    fn complexity(&self) -> Complexity {
        match (self.fast, self.complex) {
            (true, _) => Complexity::Fast,
            (_, true) => Complexity::Complex,
            _ => Complexity::Balanced,
        }
    }
}

fn is_glt(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("glt"))
}

fn load(path: &Path) -> Result<Texture, Error> {
    if is_glt(path) {
        return Texture::load(path).with_context(|| format!("reading {}", path.display()));
    }

    let im = ImageReader::new(BufReader::new(
        File::open(path).with_context(|| format!("opening {}", path.display()))?,
    ))
    .with_guessed_format()?
    .decode()
    .with_context(|| format!("decoding {}", path.display()))?
    .into_rgba8();

    Ok(Texture::new(
        im.width() as usize,
        im.height() as usize,
        im.into_raw(),
    ))
}

fn store(mut texture: Texture, path: &Path) -> Result<(), Error> {
    if is_glt(path) {
        return texture
            .store(path)
            .with_context(|| format!("writing {}", path.display()));
    }

    texture.normalize_rgba();
    save_buffer(
        path,
        &texture.data,
        u32::try_from(texture.width)?,
        u32::try_from(texture.height)?,
        ColorType::Rgba8,
    )
    .with_context(|| format!("writing {}", path.display()))
}

fn usage() -> ExitCode {
    eprintln!("{}", Args::command().render_usage());
    ExitCode::from(USAGE_EXIT)
}

fn run(args: Args) -> Result<(), Error> {
    let config = Config::from(args.complexity());

    let mut texture = load(&args.input)?;
    info!(
        width = texture.width,
        height = texture.height,
        ?config,
        "dismantling {}",
        args.input.display()
    );

    dismantle(&mut texture.grid()?, &args.key, &config)?;

    store(texture, &args.output)
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            let _ = e.print();
            return ExitCode::from(USAGE_EXIT);
        }
        Err(e) => e.exit(),
    };
    if args.key.is_empty() {
        return usage();
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}
