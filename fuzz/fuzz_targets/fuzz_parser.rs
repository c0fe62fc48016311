#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use xmlmodem::{Collector, ParseEvent, ParserError, ParserOptions, StreamingParser};

/// Fragments that steer the input towards interesting parser states.
static SNIPPETS: &[&str] = &[
    "<",
    ">",
    "/>",
    "</",
    "<!--",
    "-->",
    "<![CDATA[",
    "]]>",
    "<?xml version=\"1.0\"?>",
    "<?",
    "?>",
    "<!DOCTYPE r [",
    "]>",
    "<!ENTITY e \"v\">",
    "<!ATTLIST r a CDATA #IMPLIED>",
    "<!ELEMENT r ANY>",
    "<!NOTATION n SYSTEM \"s\">",
    "<r>",
    "</r>",
    "<e k=\"v\">",
    "</e>",
    " k='v'",
    "猫",
    "\n",
];

#[derive(Debug, Arbitrary)]
enum Piece {
    Snippet(u8),
    Text(String),
}

#[derive(Debug, Arbitrary)]
struct Input {
    skip_root: bool,
    comment_window: Option<u8>,
    split_seed: u32,
    pieces: Vec<Piece>,
}

fn render(pieces: &[Piece]) -> String {
    let mut out = String::new();
    for piece in pieces {
        match piece {
            Piece::Snippet(i) => out.push_str(SNIPPETS[*i as usize % SNIPPETS.len()]),
            Piece::Text(text) => out.push_str(text),
        }
    }
    out
}

fn run(chunks: &[&str], options: &ParserOptions) -> (Vec<ParseEvent>, Option<ParserError>) {
    let mut parser = StreamingParser::new(options.clone());
    let mut events = Collector::default();
    for chunk in chunks {
        if let Err(err) = parser.feed(chunk, &mut events) {
            return (events.into_events(), Some(err));
        }
    }
    let result = parser.finish();
    (events.into_events(), result.err())
}

fuzz_target!(|input: Input| {
    let text = render(&input.pieces);
    if text.is_empty() {
        return;
    }
    let options = ParserOptions {
        skip_root: input.skip_root,
        comment_window: input.comment_window.map(usize::from),
        panic_on_error: false,
        ..Default::default()
    };

    // Chunking must not change what the parser reports.
    let whole = run(&[text.as_str()], &options);
    let chunks = split_into_safe_chunks(&text, u64::from(input.split_seed));
    let split = run(&chunks, &options);
    assert_eq!(whole, split);
});

/// Split a UTF-8 `&str` into boundary-safe chunks using a deterministic random
/// value to generate splits.
///
/// * `split_seed` may be any `u64`.
/// * Each chunk is at least one byte.
/// * Every slice ends on a valid UTF-8 boundary, so it can’t panic.
fn split_into_safe_chunks(serialized: &str, split_seed: u64) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let len = serialized.len();
    let mut seed = split_seed;

    while start < len {
        let remaining = len - start;

        let mut size = (seed as usize % remaining) + 1;
        while start + size < len && !serialized.is_char_boundary(start + size) {
            size += 1;
        }

        chunks.push(&serialized[start..start + size]);
        start += size;
        seed = seed.rotate_left(7) ^ 0x9e37_79b9;
    }

    chunks
}
