//! Command-line option table with typed, default-aware accessors.
//!
//! This crate turns raw process arguments into an [`ArgTable`] and answers
//! typed queries against it:
//!
//! - [`ArgTable::parse`] — normalizes `-name` / `--name[=value]` tokens,
//!   applies last-occurrence-wins, and resolves negated flags (`-noX`).
//! - [`ArgTable::get_arg`], [`ArgTable::get_int_arg`],
//!   [`ArgTable::get_bool_arg`] — lookups that fall back to a caller
//!   default when the option is absent.
//! - [`parse_leading_int`] — the permissive integer coercion behind the
//!   integer and boolean accessors.
//!
//! Lookups never fail. Hosts that want to reject malformed values can use
//! [`ArgTable::try_get_arg`], which reports an [`ArgError`].
//!
//! # Example
//!
//! ```
//! use argmap_core::ArgTable;
//!
//! let mut args = ArgTable::parse(["--testnet", "-nodebug", "-maxpeers=x", "start"]);
//!
//! // Defaults applied by the host never override the command line.
//! args.soft_set_bool_arg("-testnet", false);
//! args.soft_set_arg("-maxpeers", "125");
//!
//! assert!(args.get_bool_arg("-testnet", false));
//! assert!(!args.get_bool_arg("-debug", true));
//! assert_eq!(args.get_int_arg("-maxpeers", 125), 0);
//! assert_eq!(args.get_arg("-datadir", "/var/lib/node"), "/var/lib/node");
//! assert_eq!(args.positional(), ["start"]);
//! ```

mod error;
mod numeric;
mod table;

pub use error::{ArgError, Result};
pub use numeric::parse_leading_int;
pub use table::{ArgTable, NEGATION_PREFIX, OPTION_PREFIX, VALUE_DELIMITER};
