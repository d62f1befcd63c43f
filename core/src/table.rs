//! Option table construction and typed lookups.
//!
//! [`ArgTable::parse`] turns raw command-line tokens into a map of normalized
//! option names to string values. The typed accessors then read that map
//! with default-value fallback:
//!
//! | Accessor                          | Absent    | Present                          |
//! |-----------------------------------|-----------|----------------------------------|
//! | [`get_arg`](ArgTable::get_arg)     | `default` | stored value, verbatim           |
//! | [`get_int_arg`](ArgTable::get_int_arg) | `default` | leading integer, `0` if none |
//! | [`get_bool_arg`](ArgTable::get_bool_arg) | `default` | `""` or nonzero integer   |

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ArgError, Result};
use crate::numeric::{parse_leading_int, value_as_bool};

/// Character that introduces an option token. Normalized names carry one.
pub const OPTION_PREFIX: char = '-';

/// Separates an option name from its value (first occurrence only).
pub const VALUE_DELIMITER: char = '=';

/// Bare-name prefix that marks a negated flag (`-noX` negates `-X`).
pub const NEGATION_PREFIX: &str = "no";

/// Parsed command-line options.
///
/// Built once from a token list by [`ArgTable::parse`] and then queried
/// through the typed accessors. A fresh parse produces a fresh table, so
/// independent tables never share state.
///
/// # Examples
///
/// ```
/// use argmap_core::ArgTable;
///
/// let args = ArgTable::parse(["-datadir=/tmp/node", "--nolisten", "-rpcport=8332"]);
///
/// assert_eq!(args.get_arg("-datadir", "~/.node"), "/tmp/node");
/// assert_eq!(args.get_int_arg("-rpcport", 0), 8332);
/// assert!(!args.get_bool_arg("-listen", true));
/// assert!(!args.is_set("-nolisten"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgTable {
    /// Resolved value per normalized option name.
    options: BTreeMap<String, String>,
    /// Every value given per option name, in command-line order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    multi_values: BTreeMap<String, Vec<String>>,
    /// Tokens following the first non-option token.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    positional: Vec<String>,
}

impl ArgTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses raw command-line tokens (program name excluded).
    ///
    /// Tokens are read as `-name`, `--name`, `-name=value` or
    /// `--name=value`. The first token that does not start with `-` ends
    /// option processing; it and everything after it are kept as
    /// [`positional`](Self::positional) arguments. When a name repeats, the
    /// last value wins.
    ///
    /// After all tokens are read, each negated flag `-noX` is resolved: if
    /// `-X` was not given, `-X` is set to the inverse of the negated flag's
    /// boolean value; if `-X` was given, the negated flag is dropped. This
    /// makes `-X -noX` and `-noX -X` equivalent.
    ///
    /// Parsing never fails. An empty token list yields an empty table.
    pub fn parse<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut given = BTreeMap::new();
        let mut multi_values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut positional = Vec::new();

        let mut tokens = raw.into_iter();
        for token in tokens.by_ref() {
            let token = token.as_ref();
            let Some((name, value)) = split_option(token) else {
                positional.push(token.to_string());
                break;
            };
            multi_values
                .entry(name.clone())
                .or_default()
                .push(value.clone());
            given.insert(name, value);
        }
        positional.extend(tokens.map(|token| token.as_ref().to_string()));

        let options = resolve_negations(&given, &mut multi_values);

        debug!(
            options = options.len(),
            positional = positional.len(),
            "Parsed command-line arguments"
        );

        Self {
            options,
            multi_values,
            positional,
        }
    }

    /// Parses the current process's arguments, skipping the program name.
    ///
    /// Arguments that are not valid UTF-8 are converted lossily.
    pub fn from_env() -> Self {
        Self::parse(
            std::env::args_os()
                .skip(1)
                .map(|arg| arg.to_string_lossy().into_owned()),
        )
    }

    /// Returns the raw stored value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Returns `true` if `name` has a value in the table.
    pub fn is_set(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Returns the value of `name`, or `default` when it is absent.
    ///
    /// A flag given without a value yields `""`, not `default`.
    ///
    /// # Examples
    ///
    /// ```
    /// use argmap_core::ArgTable;
    ///
    /// let args = ArgTable::parse(["-name"]);
    /// assert_eq!(args.get_arg("-name", "fallback"), "");
    /// assert_eq!(args.get_arg("-other", "fallback"), "fallback");
    /// ```
    pub fn get_arg(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or(default).to_string()
    }

    /// Returns the integer value of `name`, or `default` when it is absent.
    ///
    /// A present value is read with [`parse_leading_int`]; a value with no
    /// leading integer yields `0`, not `default`.
    ///
    /// # Examples
    ///
    /// ```
    /// use argmap_core::ArgTable;
    ///
    /// let args = ArgTable::parse(["-threads=NaN"]);
    /// assert_eq!(args.get_int_arg("-threads", 4), 0);
    /// assert_eq!(args.get_int_arg("-connections", 8), 8);
    /// ```
    pub fn get_int_arg(&self, name: &str, default: i64) -> i64 {
        self.get(name).map_or(default, parse_leading_int)
    }

    /// Returns the boolean value of `name`, or `default` when it is absent.
    ///
    /// An empty value is `true`; otherwise the value is `true` iff its
    /// leading integer is nonzero.
    pub fn get_bool_arg(&self, name: &str, default: bool) -> bool {
        self.get(name).map_or(default, value_as_bool)
    }

    /// Strictly converts the value of `name` with [`FromStr`].
    ///
    /// Returns `Ok(None)` when `name` is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ArgError::InvalidValue`] if the stored value does not parse
    /// as `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use argmap_core::ArgTable;
    ///
    /// let args = ArgTable::parse(["-port=8333", "-timeout=soon"]);
    /// assert_eq!(args.try_get_arg::<u16>("-port").unwrap(), Some(8333));
    /// assert_eq!(args.try_get_arg::<u16>("-missing").unwrap(), None);
    /// assert!(args.try_get_arg::<u64>("-timeout").is_err());
    /// ```
    pub fn try_get_arg<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        value
            .parse()
            .map(Some)
            .map_err(|err: T::Err| ArgError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
                reason: err.to_string(),
            })
    }

    /// Returns every value given for `name`, in command-line order.
    ///
    /// Empty when `name` is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use argmap_core::ArgTable;
    ///
    /// let args = ArgTable::parse(["-connect=a", "-connect=b"]);
    /// assert_eq!(args.get_multi_arg("-connect"), ["a", "b"]);
    /// assert_eq!(args.get_arg("-connect", ""), "b");
    /// ```
    pub fn get_multi_arg(&self, name: &str) -> &[String] {
        self.multi_values
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Sets `name` to `value` unless it already has a value.
    ///
    /// Returns `true` if the value was stored. Command-line values always
    /// take precedence over values applied this way.
    pub fn soft_set_arg(&mut self, name: &str, value: impl Into<String>) -> bool {
        if self.is_set(name) {
            return false;
        }
        let value = value.into();
        self.multi_values
            .insert(name.to_string(), vec![value.clone()]);
        self.options.insert(name.to_string(), value);
        true
    }

    /// Boolean form of [`soft_set_arg`](Self::soft_set_arg), storing `"1"`
    /// or `"0"`.
    pub fn soft_set_bool_arg(&mut self, name: &str, value: bool) -> bool {
        self.soft_set_arg(name, bool_value(value))
    }

    /// Tokens that followed the end of option processing.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of options in the table.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns `true` if no options were recorded.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Splits an option token into its normalized name and value.
///
/// Returns `None` for tokens that do not start with [`OPTION_PREFIX`].
fn split_option(token: &str) -> Option<(String, String)> {
    let rest = token.strip_prefix(OPTION_PREFIX)?;
    let rest = rest.strip_prefix(OPTION_PREFIX).unwrap_or(rest);
    let (bare, value) = rest.split_once(VALUE_DELIMITER).unwrap_or((rest, ""));
    Some((format!("{OPTION_PREFIX}{bare}"), value.to_string()))
}

/// Returns the positive key for a negated key (`-noX` -> `-X`).
fn positive_key(name: &str) -> Option<String> {
    let bare = name.strip_prefix(OPTION_PREFIX)?;
    bare.strip_prefix(NEGATION_PREFIX)
        .map(|positive| format!("{OPTION_PREFIX}{positive}"))
}

fn bool_value(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Folds negated keys into their positive form.
///
/// Presence is checked against `given` (the table as read from the command
/// line), so synthesized keys never feed back into resolution.
fn resolve_negations(
    given: &BTreeMap<String, String>,
    multi_values: &mut BTreeMap<String, Vec<String>>,
) -> BTreeMap<String, String> {
    let mut options = BTreeMap::new();
    let mut negated = Vec::new();

    for (name, value) in given {
        match positive_key(name) {
            Some(positive) => negated.push((name, positive, value)),
            None => {
                options.insert(name.clone(), value.clone());
            }
        }
    }

    for (name, positive, value) in negated {
        multi_values.remove(name);
        if given.contains_key(&positive) {
            debug!(negated = %name, positive = %positive, "Explicit option overrides negated flag");
            continue;
        }
        let resolved = bool_value(!value_as_bool(value));
        multi_values.insert(positive.clone(), vec![resolved.to_string()]);
        options.insert(positive, resolved.to_string());
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a table from a whitespace-separated command line.
    fn reset_args(command_line: &str) -> ArgTable {
        ArgTable::parse(command_line.split_whitespace())
    }

    #[test]
    fn test_flag_without_value_is_true() {
        let args = reset_args("-BUY");
        assert!(args.get_bool_arg("-BUY", false));
        assert!(args.get_bool_arg("-BUY", true));

        assert!(!args.get_bool_arg("-fo", false));
        assert!(args.get_bool_arg("-fo", true));
        assert!(!args.get_bool_arg("-BUYo", false));
        assert!(args.get_bool_arg("-BUYo", true));
    }

    #[test]
    fn test_bool_explicit_values() {
        let args = reset_args("-BUY=0");
        assert!(!args.get_bool_arg("-BUY", false));
        assert!(!args.get_bool_arg("-BUY", true));

        let args = reset_args("-BUY=1");
        assert!(args.get_bool_arg("-BUY", false));
        assert!(args.get_bool_arg("-BUY", true));

        let args = reset_args("-BUY=yes");
        assert!(!args.get_bool_arg("-BUY", true));
    }

    #[test]
    fn test_negated_flag_sets_positive_false() {
        for line in ["-noBUY", "-noBUY=1", "--noBUY=1", "--noBUY"] {
            let args = reset_args(line);
            assert!(!args.get_bool_arg("-BUY", false), "{line}");
            assert!(!args.get_bool_arg("-BUY", true), "{line}");
            assert_eq!(args.get_arg("-BUY", ""), "0", "{line}");
        }
    }

    #[test]
    fn test_negated_flag_with_false_value_sets_positive_true() {
        let args = reset_args("-noBUY=0");
        assert!(args.get_bool_arg("-BUY", false));
        assert!(args.get_bool_arg("-BUY", true));
        assert_eq!(args.get_arg("-BUY", ""), "1");
    }

    #[test]
    fn test_explicit_positive_wins_regardless_of_order() {
        for line in ["-BUY -noBUY", "-noBUY -BUY", "-BUY --noBUY", "-BUY=1 -noBUY=1"] {
            let args = reset_args(line);
            assert!(args.get_bool_arg("-BUY", false), "{line}");
            assert!(args.get_bool_arg("-BUY", true), "{line}");
        }

        let args = reset_args("-BUY=0 -noBUY=0");
        assert!(!args.get_bool_arg("-BUY", false));
        assert!(!args.get_bool_arg("-BUY", true));
    }

    #[test]
    fn test_negated_key_is_never_stored() {
        let args = reset_args("-noBUY -BUY=7");
        assert!(!args.is_set("-noBUY"));
        assert!(args.get_multi_arg("-noBUY").is_empty());
        assert_eq!(args.get_arg("-BUY", ""), "7");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_double_negation_resolves_once() {
        let args = reset_args("-nonoBUY");
        assert!(!args.get_bool_arg("-noBUY", true));
        assert!(!args.is_set("-BUY"));

        let args = reset_args("-nonoBUY -noBUY");
        assert!(!args.is_set("-noBUY"));
        assert!(!args.get_bool_arg("-BUY", true));
    }

    #[test]
    fn test_string_arg() {
        let args = reset_args("");
        assert_eq!(args.get_arg("-BUY", ""), "");
        assert_eq!(args.get_arg("-BUY", "eleven"), "eleven");

        let args = reset_args("-BUY -bar");
        assert_eq!(args.get_arg("-BUY", ""), "");
        assert_eq!(args.get_arg("-BUY", "eleven"), "");

        let args = reset_args("-BUY=");
        assert_eq!(args.get_arg("-BUY", "eleven"), "");

        let args = reset_args("-BUY=11");
        assert_eq!(args.get_arg("-BUY", "eleven"), "11");

        let args = reset_args("-BUY=eleven");
        assert_eq!(args.get_arg("-BUY", ""), "eleven");
    }

    #[test]
    fn test_value_keeps_everything_after_first_delimiter() {
        let args = reset_args("-rpcauth=user=pass=word");
        assert_eq!(args.get_arg("-rpcauth", ""), "user=pass=word");
    }

    #[test]
    fn test_int_arg() {
        let args = reset_args("");
        assert_eq!(args.get_int_arg("-BUY", 11), 11);
        assert_eq!(args.get_int_arg("-BUY", 0), 0);

        let args = reset_args("-BUY -bar");
        assert_eq!(args.get_int_arg("-BUY", 11), 0);
        assert_eq!(args.get_int_arg("-bar", 11), 0);

        let args = reset_args("-BUY=11 -bar=12");
        assert_eq!(args.get_int_arg("-BUY", 0), 11);
        assert_eq!(args.get_int_arg("-bar", 11), 12);

        let args = reset_args("-BUY=NaN -bar=NotANumber");
        assert_eq!(args.get_int_arg("-BUY", 1), 0);
        assert_eq!(args.get_int_arg("-bar", 11), 0);
    }

    #[test]
    fn test_double_dash_matches_single_dash() {
        let args = reset_args("--BUY");
        assert!(args.get_bool_arg("-BUY", false));

        let args = reset_args("--BUY=verbose --bar=1");
        assert_eq!(args.get_arg("-BUY", ""), "verbose");
        assert_eq!(args.get_int_arg("-bar", 0), 1);
        assert!(!args.is_set("--BUY"));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let args = reset_args("-BUY=11 -BUY=22");
        assert_eq!(args.get_arg("-BUY", ""), "22");
        assert_eq!(args.get_multi_arg("-BUY"), ["11", "22"]);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let args = reset_args("-Buy=1");
        assert!(args.is_set("-Buy"));
        assert!(!args.is_set("-buy"));
    }

    #[test]
    fn test_first_positional_ends_option_processing() {
        let args = reset_args("-a=1 run -b=2 extra");
        assert_eq!(args.get_arg("-a", ""), "1");
        assert!(!args.is_set("-b"));
        assert_eq!(args.positional(), ["run", "-b=2", "extra"]);
    }

    #[test]
    fn test_empty_name_is_accepted() {
        let args = reset_args("- --=x");
        assert_eq!(args.get_arg("-", "default"), "x");
        assert_eq!(args.get_multi_arg("-"), ["", "x"]);
    }

    #[test]
    fn test_soft_set_does_not_override_command_line() {
        let mut args = reset_args("-listen=0");
        assert!(!args.soft_set_bool_arg("-listen", true));
        assert!(!args.get_bool_arg("-listen", true));

        assert!(args.soft_set_arg("-bind", "127.0.0.1"));
        assert_eq!(args.get_arg("-bind", ""), "127.0.0.1");
        assert!(!args.soft_set_arg("-bind", "0.0.0.0"));
        assert_eq!(args.get_multi_arg("-bind"), ["127.0.0.1"]);
    }

    #[test]
    fn test_soft_set_does_not_override_negation() {
        let mut args = reset_args("-nolisten");
        assert!(!args.soft_set_bool_arg("-listen", true));
        assert!(!args.get_bool_arg("-listen", true));
    }

    #[test]
    fn test_try_get_arg_reports_invalid_value() {
        let args = reset_args("-port=abc");
        let err = args.try_get_arg::<u16>("-port").unwrap_err();
        assert!(matches!(
            &err,
            ArgError::InvalidValue { name, value, .. } if name == "-port" && value == "abc"
        ));
        assert!(err.to_string().starts_with("invalid value 'abc' for option -port"));
    }

    #[test]
    fn test_reparse_replaces_table() {
        let mut args = reset_args("-BUY=1 -bar");
        assert!(args.is_set("-BUY"));
        args = reset_args("-baz");
        assert!(!args.is_set("-BUY"));
        assert!(!args.is_set("-bar"));
        assert!(args.is_set("-baz"));
    }

    #[test]
    fn test_iter_is_sorted() {
        let args = reset_args("-b=2 -a=1 -noc");
        let pairs: Vec<_> = args.iter().collect();
        assert_eq!(pairs, vec![("-a", "1"), ("-b", "2"), ("-c", "0")]);
    }

    #[test]
    fn test_serde_roundtrip_preserves_table() {
        let args = reset_args("-a=1 -a=2 -nob pos");
        let json = serde_json::to_string(&args).unwrap();
        let back: ArgTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, args);
    }
}
