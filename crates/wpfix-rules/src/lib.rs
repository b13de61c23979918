//! wpfix-rules: Rewrite rule implementations
//!
//! Available rules, in the order they are tried at each token:
//! - yoda_condition: Convert $x === 'a' to 'a' === $x
//! - short_ternary: Convert $x ?: $d to $x ? $x : $d
//! - wp_die_translate: Convert wp_die(__()) to wp_die(esc_html__())
//! - echo_translate: Convert echo __() to echo esc_html__()
//! - escape_i18n: Convert _e() to esc_html_e()
//! - safe_redirect: Convert wp_redirect() to wp_safe_redirect()
//! - in_array_strict: Add `true` to two-argument in_array() calls
//!
//! Further name-for-name renames can be supplied as `RenameSpec`s.

pub mod call_rename;
mod common;
pub mod echo_translate;
pub mod error;
pub mod in_array_strict;
pub mod registry;
pub mod short_ternary;
pub mod wp_die_translate;
pub mod yoda_condition;

pub use call_rename::{CallRenameRule, RenameSpec};
pub use echo_translate::EchoTranslateRule;
pub use error::RuleError;
pub use in_array_strict::InArrayStrictRule;
pub use registry::{Rule, RuleRegistry};
pub use short_ternary::ShortTernaryRule;
pub use wp_die_translate::WpDieTranslateRule;
pub use yoda_condition::YodaConditionRule;
