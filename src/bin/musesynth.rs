// muse-synth -- pitched music from rapidly triggered drums
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.


use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use structopt::StructOpt;

use muse_synth::compile;
use musesynth_engine::config::{self, Config};

#[derive(Debug, StructOpt)]
#[structopt(name = "musesynth", about = "Writing pitched music for drums")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// The command file describing the score.
    #[structopt(parse(from_os_str))]
    source: PathBuf,

    /// Output file for the action listing. Printed to stdout if not given.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Label every tempo change, not only the first one of each note.
    #[structopt(long)]
    display_tempos: bool,

    /// Notes per 128th note in the lead voice, unless a note declares its own.
    #[structopt(long, default_value = "4")]
    division: u32,

    /// MIDI drum pitch for voices without an `instrument` command.
    #[structopt(long, default_value = "41")]
    instrument: u8,
}

fn main() -> io::Result<()> {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let config = Config {
        default_division: opt.division,
        default_instrument: opt.instrument,
        display_tempos: opt.display_tempos,
    };
    if opt.division != config::DEFAULT_DIVISION {
        log::debug!("lead voice divides each 128th note into {}", opt.division);
    }

    let source = std::fs::read_to_string(&opt.source)?;
    let actions = compile::compile(&opt.source.to_string_lossy(), &source, config)?;
    log::info!("writing {} actions", actions.len());

    match &opt.output {
        Some(path) => compile::write_listing(BufWriter::new(File::create(path)?), &actions),
        None => compile::write_listing(io::stdout(), &actions),
    }
}
