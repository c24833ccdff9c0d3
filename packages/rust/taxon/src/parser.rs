//! Scientific-name parser.
//!
//! Accepts botanical names of the form:
//! - `Genus`
//! - `Genus epithet`, `Genus x epithet` (hybrid)
//! - `Genus epithet subsp. epithet`, `var.`, `f.` and `ssp.` qualifiers, repeatable
//! - any of the above followed by a quoted cultivar: `'Name'` or `‘Name’`
//!
//! Parts are separated by a single space. The hybrid marker `x ` is stored
//! as `× `.

use plantpresets_shared::PresetsError;

/// Infraspecific rank abbreviations, longest first so `subsp.` wins over `ssp.`.
const RANKS: [&str; 4] = ["subsp.", "ssp.", "var.", "f."];

/// Hybrid marker as written in the input.
const HYBRID_INPUT: &str = "x ";

/// Hybrid marker as stored.
const HYBRID_MARK: &str = "× ";

/// Structural fields of a scientific name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTaxon {
    pub genus: String,
    pub species: Option<String>,
    /// Cultivar name without its quotes.
    pub cultivar: Option<String>,
}

/// Which part of the grammar rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected a capitalized genus")]
    Genus,
    #[error("expected a lowercase species epithet of at least two letters")]
    SpeciesEpithet,
    #[error("expected an epithet after the rank abbreviation")]
    InfraspecificEpithet,
    #[error("expected a quoted, non-empty cultivar name")]
    Cultivar,
    #[error("unexpected trailing input")]
    TrailingInput,
}

/// A taxon string that does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unexpected taxon {input:?}: {kind}")]
pub struct TaxonParseError {
    /// The offending input, verbatim.
    pub input: String,
    pub kind: ParseErrorKind,
}

impl From<TaxonParseError> for PresetsError {
    fn from(err: TaxonParseError) -> Self {
        PresetsError::parse(err.input, err.kind.to_string())
    }
}

impl std::str::FromStr for ParsedTaxon {
    type Err = TaxonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_taxon(s)
    }
}

/// Parse one taxon string.
pub fn parse_taxon(input: &str) -> Result<ParsedTaxon, TaxonParseError> {
    let fail = |kind| TaxonParseError {
        input: input.to_string(),
        kind,
    };

    let mut cur = Cursor::new(input);

    let genus = genus(&mut cur).ok_or_else(|| fail(ParseErrorKind::Genus))?;

    let species = if cur.peek_is(|c| c == ' ') && !cur.rest()[1..].starts_with(is_quote) {
        cur.eat(" ");
        Some(species(&mut cur).map_err(fail)?)
    } else {
        None
    };

    let cultivar = if cur.eat(" ") {
        Some(cultivar(&mut cur).ok_or_else(|| fail(ParseErrorKind::Cultivar))?)
    } else {
        None
    };

    if !cur.is_done() {
        return Err(fail(ParseErrorKind::TrailingInput));
    }

    Ok(ParsedTaxon {
        genus: genus.to_string(),
        species,
        cultivar,
    })
}

// ---------------------------------------------------------------------------
// Productions
// ---------------------------------------------------------------------------

/// `[A-Z][a-z-]+`
fn genus<'a>(cur: &mut Cursor<'a>) -> Option<&'a str> {
    let start = cur.pos;
    if !cur.bump_if(|c| c.is_ascii_uppercase()) {
        return None;
    }
    if cur.take_while(is_epithet_char).is_empty() {
        cur.pos = start;
        return None;
    }
    Some(&cur.input[start..cur.pos])
}

/// `(x )?epithet( rank epithet)*`, normalized.
fn species(cur: &mut Cursor<'_>) -> Result<String, ParseErrorKind> {
    let hybrid = cur.eat(HYBRID_INPUT);
    let start = cur.pos;

    epithet(cur).ok_or(ParseErrorKind::SpeciesEpithet)?;

    loop {
        let checkpoint = cur.pos;
        if !cur.eat(" ") {
            break;
        }
        let ranked = RANKS.iter().any(|rank| cur.eat(rank)) && cur.eat(" ");
        if !ranked {
            // The space belongs to the cultivar, or is trailing garbage.
            cur.pos = checkpoint;
            break;
        }
        epithet(cur).ok_or(ParseErrorKind::InfraspecificEpithet)?;
    }

    let body = &cur.input[start..cur.pos];
    Ok(if hybrid {
        format!("{HYBRID_MARK}{body}")
    } else {
        body.to_string()
    })
}

/// `[a-z-]{2,}`
fn epithet<'a>(cur: &mut Cursor<'a>) -> Option<&'a str> {
    let start = cur.pos;
    let word = cur.take_while(is_epithet_char);
    if word.chars().count() < 2 {
        cur.pos = start;
        return None;
    }
    Some(word)
}

/// `'name'` or `‘name’` running to the end of input.
fn cultivar(cur: &mut Cursor<'_>) -> Option<String> {
    let rest = cur.rest();
    let name = rest
        .strip_prefix('\'')
        .and_then(|r| r.strip_suffix('\''))
        .or_else(|| rest.strip_prefix('‘').and_then(|r| r.strip_suffix('’')))?;
    if name.is_empty() {
        return None;
    }
    cur.pos = cur.input.len();
    Some(name.to_string())
}

fn is_epithet_char(c: char) -> bool {
    c.is_ascii_lowercase() || c == '-'
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '‘'
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn is_done(&self) -> bool {
        self.pos == self.input.len()
    }

    fn peek_is(&self, pred: impl Fn(char) -> bool) -> bool {
        self.rest().chars().next().is_some_and(pred)
    }

    fn bump_if(&mut self, pred: impl Fn(char) -> bool) -> bool {
        match self.rest().chars().next() {
            Some(c) if pred(c) => {
                self.pos += c.len_utf8();
                true
            }
            _ => false,
        }
    }

    fn eat(&mut self, lit: &str) -> bool {
        if self.rest().starts_with(lit) {
            self.pos += lit.len();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.bump_if(&pred) {}
        &self.input[start..self.pos]
    }
}
