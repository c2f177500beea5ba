//! Decodes hex-encoded packets and prints them as JSON.
//!
//! ```text
//! packet-dump [--request|--response] <hex>...
//! ```
//!
//! Packets are read as responses unless `--request` is given. Whitespace,
//! `:` separators and a leading `0x` are ignored. Set `RUST_LOG=debug` to
//! see the dispatcher's logs on stderr.

use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use vlwire::prelude::*;

#[derive(Parser)]
#[command(
    name = "packet-dump",
    version,
    about = "Decode hex-encoded packets and print them as JSON"
)]
struct Args {
    /// Decode the packets as requests
    #[arg(long, conflicts_with = "response")]
    request: bool,

    /// Decode the packets as responses (the default)
    #[arg(long)]
    response: bool,

    /// Hex-encoded packets, header included
    #[arg(required = true, value_name = "HEX")]
    packets: Vec<String>,
}

impl Args {
    fn direction(&self) -> Direction {
        if self.request {
            Direction::Request
        } else {
            Direction::Response
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Request,
    Response,
}

fn main() -> ExitCode {
    let args = Args::parse();
    vlwire::init_tracing("warn");

    let direction = args.direction();
    let packets = args.packets;

    let dispatcher = Dispatcher::default();
    let mut failed = 0usize;
    for (index, hex) in packets.iter().enumerate() {
        match dump(&dispatcher, direction, hex) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                failed += 1;
                eprintln!("packet {index}: {err}");
            }
        }
    }

    info!(total = packets.len(), failed, "done");
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn dump(dispatcher: &Dispatcher, direction: Direction, hex: &str) -> Result<String, String> {
    let bytes = parse_hex(hex)?;
    let json = match direction {
        Direction::Request => dispatcher
            .parse_request(&bytes)
            .map_err(VlwireError::from)
            .and_then(|frame| vlwire::to_json(&frame)),
        Direction::Response => dispatcher
            .parse_response(&bytes)
            .map_err(VlwireError::from)
            .and_then(|frame| vlwire::to_json(&frame)),
    };
    json.map_err(|err| err.to_string())
}

fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: Vec<u8> = trimmed
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':')
        .collect();

    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }

    digits
        .chunks_exact(2)
        .map(|pair| {
            let hi = hex_value(pair[0])?;
            let lo = hex_value(pair[1])?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

fn hex_value(digit: u8) -> Result<u8, String> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        other => Err(format!("invalid hex digit {:?}", char::from(other))),
    }
}
