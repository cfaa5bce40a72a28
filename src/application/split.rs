//! Message splitting on natural boundaries.
//!
//! Text is cut between paragraphs (`"\n\n"`) where possible and between
//! lines (`"\n"`) inside paragraphs that are too long on their own. A
//! single line longer than the limit is never cut; it becomes its own
//! oversized chunk.

const PARAGRAPH: &str = "\n\n";
const LINE: &str = "\n";

/// A piece of split text plus the separator that followed it in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// For the last chunk: any separators that ended the input.
    pub separator: String,
}

/// Chunks plus the separators that preceded the first one.
///
/// Input made only of separators has no chunks; all of it is `leading`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    pub leading: String,
    pub chunks: Vec<Chunk>,
}

/// Split `text` into chunks of at most `max_len` characters.
///
/// Empty input yields no chunks; no chunk is ever empty.
#[must_use]
pub fn split(text: &str, max_len: usize) -> Vec<String> {
    split_with_separators(text, max_len)
        .chunks
        .into_iter()
        .map(|chunk| chunk.text)
        .collect()
}

/// Like [`split`], keeping the separators dropped at each boundary so the
/// input can be reassembled exactly with [`reassemble`].
#[must_use]
pub fn split_with_separators(text: &str, max_len: usize) -> Split {
    let (units, trailing) = units(text, max_len);
    let mut units = units.into_iter();
    let Some(first) = units.next() else {
        return Split {
            leading: trailing,
            chunks: Vec::new(),
        };
    };

    let mut chunks = Vec::new();
    let mut current = first.text.to_string();
    let mut current_len = char_len(first.text);

    for unit in units {
        let unit_len = char_len(unit.text);
        let separator_len = char_len(&unit.separator);
        if current_len + separator_len + unit_len <= max_len {
            current.push_str(&unit.separator);
            current.push_str(unit.text);
            current_len += separator_len + unit_len;
        } else {
            chunks.push(Chunk {
                text: std::mem::take(&mut current),
                separator: unit.separator,
            });
            current.push_str(unit.text);
            current_len = unit_len;
        }
    }

    chunks.push(Chunk {
        text: current,
        separator: trailing,
    });
    Split {
        leading: first.separator,
        chunks,
    }
}

/// Join chunks back together with their recorded separators.
#[must_use]
pub fn reassemble(split: &Split) -> String {
    let mut out = split.leading.clone();
    for chunk in &split.chunks {
        out.push_str(&chunk.text);
        out.push_str(&chunk.separator);
    }
    out
}

/// A non-empty piece of text and the separator run that preceded it.
struct Unit<'a> {
    separator: String,
    text: &'a str,
}

/// Break text into paragraphs, or lines for oversized paragraphs.
///
/// Empty or newline-only paragraphs and lines fold into the next unit's
/// separator; the returned string holds separators left after the last unit.
fn units(text: &str, max_len: usize) -> (Vec<Unit<'_>>, String) {
    let mut units = Vec::new();
    let mut pending = String::new();

    for (p_index, paragraph) in text.split(PARAGRAPH).enumerate() {
        if p_index > 0 {
            pending.push_str(PARAGRAPH);
        }
        if char_len(paragraph) <= max_len {
            push_unit(&mut units, &mut pending, paragraph);
            continue;
        }
        for (l_index, line) in paragraph.split(LINE).enumerate() {
            if l_index > 0 {
                pending.push_str(LINE);
            }
            push_unit(&mut units, &mut pending, line);
        }
    }

    (units, pending)
}

fn push_unit<'a>(units: &mut Vec<Unit<'a>>, pending: &mut String, text: &'a str) {
    if text.bytes().all(|b| b == b'\n') {
        pending.push_str(text);
        return;
    }
    units.push(Unit {
        separator: std::mem::take(pending),
        text,
    });
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
