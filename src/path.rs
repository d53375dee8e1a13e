//! The track: an ordered sequence of typed, capacity-bounded sites.
//!
//! The wire format is a single line `"<count>;"` followed by the site tokens, without
//! separators:
//!
//! ```text
//! 7;::-Mo1V11V22Mo1Mo1::-
//! ```
//!
//! A barrier is written `::-` and always gets a capacity equal to the number of players. Every
//! other site is a two letter code followed by its decimal capacity.

use std::fmt::{self, Display};

use crate::error::ParseError;

/// What happens to a player landing on a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteKind {
    /// `Mo`: earn 3 money.
    Money,
    /// `V1`: one victory point of the first kind, scored at the end.
    Score1,
    /// `V2`: one victory point of the second kind, scored at the end.
    Score2,
    /// `Do`: convert all money into points, two money per point.
    Convert,
    /// `Ri`: draw a card from the deck.
    Draw,
    /// `::`: everybody has to stop here. Never full.
    Barrier,
}

impl SiteKind {
    const BARRIER_TOKEN: &'static [u8] = b"::-";

    /// The two letter site code.
    pub fn code(self) -> &'static str {
        match self {
            SiteKind::Money => "Mo",
            SiteKind::Score1 => "V1",
            SiteKind::Score2 => "V2",
            SiteKind::Convert => "Do",
            SiteKind::Draw => "Ri",
            SiteKind::Barrier => "::",
        }
    }

    /// Site kind of a two letter code. Barriers are not read through codes.
    fn from_code(code: &[u8]) -> Option<SiteKind> {
        match code {
            b"Mo" => Some(SiteKind::Money),
            b"V1" => Some(SiteKind::Score1),
            b"V2" => Some(SiteKind::Score2),
            b"Do" => Some(SiteKind::Convert),
            b"Ri" => Some(SiteKind::Draw),
            _ => None,
        }
    }
}

impl Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single site of the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub kind: SiteKind,
    pub capacity: usize,
}

/// Parsed track, first and last sites are barriers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    sites: Vec<Site>,
    player_count: usize,
}

impl Path {
    /// Number of sites, barriers included.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Always false for a parsed path, which holds at least two barriers.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn site(&self, index: usize) -> Option<&Site> {
        self.sites.get(index)
    }

    /// Number of players the barrier capacities were sized for.
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn last_index(&self) -> usize {
        self.sites.len() - 1
    }

    /// First site of the given kind strictly after `from`.
    pub fn find_ahead(&self, kind: SiteKind, from: usize) -> Option<usize> {
        self.sites
            .iter()
            .enumerate()
            .skip(from + 1)
            .find_map(|(index, site)| (site.kind == kind).then_some(index))
    }

    /// Site names separated by spaces, e.g. `:: Mo V1 ::`.
    pub fn names(&self) -> String {
        self.sites
            .iter()
            .map(|site| site.kind.code())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Serialized form, without the trailing line break.
impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};", self.sites.len())?;
        for site in &self.sites {
            match site.kind {
                SiteKind::Barrier => write!(f, "::-")?,
                kind => write!(f, "{}{}", kind.code(), site.capacity)?,
            }
        }
        Ok(())
    }
}

fn digit_count(mut value: usize) -> usize {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}

/// Largest accepted path line for the given player and site count, line break included.
///
/// Every site token may take up to `2 + digits(player_count)` bytes.
pub fn path_byte_bound(player_count: usize, site_count: usize) -> usize {
    digit_count(site_count)
        .saturating_add(1)
        .saturating_add(site_count.saturating_mul(2 + digit_count(player_count)))
        .saturating_add(1)
}

/// Bounds checked reader over the bytes of a path line.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Cursor { bytes, pos: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn starts_with(&self, token: &[u8]) -> bool {
        self.bytes[self.pos..].starts_with(token)
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn take_byte(&mut self, byte: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Reads a non-empty run of decimal digits.
    fn take_number(&mut self) -> Option<usize> {
        let start = self.pos;
        let mut value: usize = 0;
        while let Some(byte) = self.bytes.get(self.pos).filter(|b| b.is_ascii_digit()) {
            value = value
                .checked_mul(10)?
                .checked_add(usize::from(byte - b'0'))?;
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }
}

/// Parses and validates a path line for `player_count` players.
///
/// A single trailing line break is accepted.
pub fn parse_path(text: &str, player_count: usize) -> Result<Path, ParseError> {
    if player_count == 0 {
        return Err(ParseError::NoPlayers);
    }
    let line = text.strip_suffix('\n').unwrap_or(text);
    let mut cursor = Cursor::new(line.as_bytes());

    let declared = cursor.take_number().ok_or(ParseError::MissingCount)?;
    if !cursor.take_byte(b';') {
        return Err(ParseError::MissingCount);
    }
    if declared < 2 {
        return Err(ParseError::TooShort { declared });
    }

    let bound = path_byte_bound(player_count, declared);
    if text.len() > bound {
        return Err(ParseError::Overrun {
            len: text.len(),
            bound,
        });
    }

    // every site token takes at least 3 bytes
    let mut sites = Vec::with_capacity(declared.min(line.len() / 3));
    while !cursor.is_at_end() {
        if cursor.starts_with(SiteKind::BARRIER_TOKEN) {
            cursor.pos += SiteKind::BARRIER_TOKEN.len();
            sites.push(Site {
                kind: SiteKind::Barrier,
                capacity: player_count,
            });
            continue;
        }

        let offset = cursor.pos;
        let code = cursor.take(2).ok_or(ParseError::UnknownSiteCode {
            code: String::from_utf8_lossy(&line.as_bytes()[offset..]).into_owned(),
            offset,
        })?;
        let kind = SiteKind::from_code(code).ok_or_else(|| ParseError::UnknownSiteCode {
            code: String::from_utf8_lossy(code).into_owned(),
            offset,
        })?;
        let capacity = cursor.take_number().ok_or(ParseError::BadCapacity {
            offset: cursor.pos,
        })?;
        sites.push(Site { kind, capacity });
    }

    if sites.len() != declared {
        return Err(ParseError::CountMismatch {
            declared,
            found: sites.len(),
        });
    }

    let ends_with_barriers = sites.first().map(|s| s.kind) == Some(SiteKind::Barrier)
        && sites.last().map(|s| s.kind) == Some(SiteKind::Barrier);
    if !ends_with_barriers {
        return Err(ParseError::MissingBarrier);
    }

    Ok(Path {
        sites,
        player_count,
    })
}

#[cfg(test)]
mod path_tests {
    use super::*;

    const SAMPLE: &str = "7;::-Mo1V11V22Mo1Mo1::-";

    #[test]
    fn parses_sample_path() {
        let path = parse_path(SAMPLE, 2).unwrap();
        let kinds: Vec<_> = path.sites().iter().map(|s| s.kind).collect();
        let capacities: Vec<_> = path.sites().iter().map(|s| s.capacity).collect();
        assert_eq!(
            kinds,
            vec![
                SiteKind::Barrier,
                SiteKind::Money,
                SiteKind::Score1,
                SiteKind::Score2,
                SiteKind::Money,
                SiteKind::Money,
                SiteKind::Barrier
            ]
        );
        assert_eq!(capacities, vec![2, 1, 1, 2, 1, 1, 2]);
        assert_eq!(path.player_count(), 2);
    }

    #[test]
    fn accepts_trailing_line_break() {
        let path = parse_path(&format!("{SAMPLE}\n"), 2).unwrap();
        assert_eq!(path.len(), 7);
    }

    #[test]
    fn serializes_back() {
        let path = parse_path(SAMPLE, 2).unwrap();
        assert_eq!(path.to_string(), SAMPLE);
        assert_eq!(path.names(), ":: Mo V1 V2 Mo Mo ::");
    }

    #[test]
    fn multi_digit_capacity() {
        let path = parse_path("3;::-Ri12::-", 12).unwrap();
        assert_eq!(path.site(1).map(|s| s.capacity), Some(12));
        assert_eq!(path.site(2).map(|s| s.capacity), Some(12));
    }

    #[test]
    fn rejects_count_mismatch() {
        assert_eq!(
            parse_path("8;::-Mo1V11V22Mo1Mo1::-", 2),
            Err(ParseError::CountMismatch {
                declared: 8,
                found: 7
            })
        );
        // fewer declared sites also shrink the byte bound
        assert!(parse_path("6;::-Mo1V11V22Mo1Mo1::-", 2).is_err());
        assert_eq!(
            parse_path("4;::-Mo1::-", 2),
            Err(ParseError::CountMismatch {
                declared: 4,
                found: 3
            })
        );
    }

    #[test]
    fn huge_site_count_is_a_mismatch() {
        assert!(matches!(
            parse_path("99999999999999;::-::-", 2),
            Err(ParseError::CountMismatch { found: 2, .. })
        ));
        assert!(parse_path(&format!("{};::-::-\n", usize::MAX), 2).is_err());
    }

    #[test]
    fn rejects_missing_barriers() {
        assert_eq!(
            parse_path("3;Mo1V11::-", 2),
            Err(ParseError::MissingBarrier)
        );
        assert_eq!(
            parse_path("3;::-Mo1V11", 2),
            Err(ParseError::MissingBarrier)
        );
    }

    #[test]
    fn rejects_garbled_count() {
        assert_eq!(parse_path("7::-Mo1::-", 2), Err(ParseError::MissingCount));
        assert_eq!(parse_path(";::-::-", 2), Err(ParseError::MissingCount));
        assert_eq!(parse_path("", 2), Err(ParseError::MissingCount));
        assert_eq!(
            parse_path("1;::-", 2),
            Err(ParseError::TooShort { declared: 1 })
        );
    }

    #[test]
    fn rejects_unknown_codes_and_capacities() {
        assert!(matches!(
            parse_path("3;::-Xx1::-", 2),
            Err(ParseError::UnknownSiteCode { offset: 5, .. })
        ));
        assert!(matches!(
            parse_path("3;::-Mo::-", 2),
            Err(ParseError::BadCapacity { .. })
        ));
        assert!(matches!(
            parse_path("3;::-::2::-", 2),
            Err(ParseError::UnknownSiteCode { .. })
        ));
    }

    #[test]
    fn rejects_overrun() {
        // 3 sites for 1 player: at most 1 + 1 + 3 * 3 + 1 bytes
        assert_eq!(path_byte_bound(1, 3), 12);
        assert!(matches!(
            parse_path("3;::-Mo1234::-", 1),
            Err(ParseError::Overrun { bound: 12, .. })
        ));
    }

    #[test]
    fn sample_fits_exactly_in_bound() {
        assert_eq!(path_byte_bound(2, 7), SAMPLE.len() + 1);
    }

    #[test]
    fn finds_sites_ahead() {
        let path = parse_path(SAMPLE, 2).unwrap();
        assert_eq!(path.find_ahead(SiteKind::Money, 0), Some(1));
        assert_eq!(path.find_ahead(SiteKind::Money, 1), Some(4));
        assert_eq!(path.find_ahead(SiteKind::Barrier, 0), Some(6));
        assert_eq!(path.find_ahead(SiteKind::Draw, 0), None);
        assert_eq!(path.find_ahead(SiteKind::Barrier, 6), None);
    }
}
