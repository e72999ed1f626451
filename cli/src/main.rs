// Copyright 2019 Dave Townsend
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod commands;

use std::process::exit;

use clap::{Parser, Subcommand};

use b2fs::backends::b2::B2Backend;
use b2fs::executor::run;

use commands::*;

#[derive(Parser, Debug)]
#[command(name = "b2fs", version, about = "Treats a B2 bucket as a filesystem")]
struct Cli {
    /// The application key id.
    #[arg(long, env = "B2_KEY_ID")]
    key_id: String,

    /// The application key.
    #[arg(long, env = "B2_KEY", hide_env_values = true)]
    key: String,

    /// The bucket to use.
    #[arg(long, env = "B2_BUCKET")]
    bucket: String,

    /// An alternate API host.
    #[arg(long, env = "B2_HOST")]
    host: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists the contents of a directory.
    Ls {
        /// The directory to list, defaults to the root.
        directory: Option<String>,
        /// Include everything below the directory.
        #[arg(short, long)]
        recursive: bool,
    },
    /// Writes a file's contents to stdout.
    Cat { path: String },
    /// Uploads a local file, or stdin if no file is given.
    Put {
        path: String,
        /// The local file to upload.
        #[arg(short, long)]
        file: Option<std::path::PathBuf>,
    },
    /// Deletes a file.
    Rm { path: String },
    /// Copies a file.
    Cp { source: String, target: String },
    /// Moves a file.
    Mv { source: String, target: String },
    /// Shows a file's attributes.
    Stat { path: String },
    /// Creates a directory.
    Mkdir { path: String },
    /// Deletes a directory.
    Rmdir { path: String },
    /// Checks whether a file or directory exists.
    Exists { path: String },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let mut builder = B2Backend::builder(&cli.key_id, &cli.key).bucket_name(&cli.bucket);
    if let Some(ref host) = cli.host {
        builder = builder.host(host);
    }
    let connect = builder.connect();

    let future = match cli.command {
        Command::Ls {
            directory,
            recursive,
        } => ls(connect, directory, recursive),
        Command::Cat { path } => cat(connect, path),
        Command::Put { path, file } => put(connect, path, file),
        Command::Rm { path } => rm(connect, path),
        Command::Cp { source, target } => cp(connect, source, target),
        Command::Mv { source, target } => mv(connect, source, target),
        Command::Stat { path } => stat(connect, path),
        Command::Mkdir { path } => mkdir(connect, path),
        Command::Rmdir { path } => rmdir(connect, path),
        Command::Exists { path } => exists(connect, path),
    };

    match run(future) {
        Ok(Ok(())) => (),
        Ok(Err(e)) => {
            eprintln!("{}", e);
            exit(1);
        }
        Err(e) => {
            eprintln!("Failed to start the runtime: {}", e);
            exit(1);
        }
    }
}
