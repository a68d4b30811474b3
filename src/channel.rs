//! Advertising channels
//!
//! The model has a fixed schema: three spend columns and one sales column.
//! [`Channel`] names the spend columns, and its declaration order is the
//! priority used to break ties whenever channels are ranked.
use std::str::FromStr;

/// One of the three advertising channels a budget can be spent on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Channel {
    /// Television spend
    #[serde(rename = "TV")]
    Tv,

    /// Radio spend
    Radio,

    /// Newspaper spend
    Newspaper,
}

impl Channel {
    /// All channels, in priority order (TV, Radio, Newspaper).
    pub const ALL: [Channel; 3] = [Channel::Tv, Channel::Radio, Channel::Newspaper];

    /// The column header used for this channel in input tables.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Channel::Tv => "TV",
            Channel::Radio => "Radio",
            Channel::Newspaper => "Newspaper",
        }
    }

    /// Position of this channel in the tie-break priority order.
    #[must_use]
    pub const fn priority(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// Sorts per-channel values highest first.
///
/// The sort is stable and `0.0 == -0.0`, so equal values keep the order they
/// came in; pass channels in priority order to break ties by priority.
pub(crate) fn sort_descending(values: &mut [(Channel, f64)]) {
    #[allow(clippy::float_cmp)]
    let unsigned_zero = |v: f64| if v == 0.0 { 0.0 } else { v };
    values.sort_by(|a, b| unsigned_zero(b.1).total_cmp(&unsigned_zero(a.1)));
}

/// Error returned when a string does not name a channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not an advertising channel")]
pub struct UnknownChannel(pub String);

impl FromStr for Channel {
    type Err = UnknownChannel;

    /// Header names are matched case-insensitively, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Channel::ALL
            .into_iter()
            .find(|c| c.header().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownChannel(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("tv".parse::<Channel>().unwrap(), Channel::Tv);
        assert_eq!(" RADIO ".parse::<Channel>().unwrap(), Channel::Radio);
        assert_eq!("NewsPaper".parse::<Channel>().unwrap(), Channel::Newspaper);
        assert!("sales".parse::<Channel>().is_err());
    }

    #[test]
    fn priority_follows_declaration_order() {
        let priorities: Vec<_> = Channel::ALL.iter().map(|c| c.priority()).collect();
        assert_eq!(priorities, vec![0, 1, 2]);
        assert!(Channel::Tv < Channel::Radio && Channel::Radio < Channel::Newspaper);
    }

    #[test]
    fn sort_descending_treats_signed_zeros_as_equal() {
        let mut values = [
            (Channel::Tv, -0.0),
            (Channel::Radio, 0.0),
            (Channel::Newspaper, -1.0),
        ];
        sort_descending(&mut values);
        assert_eq!(values.map(|(c, _)| c), Channel::ALL);

        let mut values = [
            (Channel::Tv, 0.0),
            (Channel::Radio, -0.0),
            (Channel::Newspaper, 1e-300),
        ];
        sort_descending(&mut values);
        assert_eq!(
            values.map(|(c, _)| c),
            [Channel::Newspaper, Channel::Tv, Channel::Radio]
        );
    }

    #[test]
    fn display_uses_header_names() {
        assert_eq!(Channel::Tv.to_string(), "TV");
        assert_eq!(
            serde_json::to_string(&Channel::Tv).unwrap(),
            "\"TV\"".to_string()
        );
    }
}
