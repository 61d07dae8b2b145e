/*!
# Token Normalizer

Maps tokens to the text handed to the duplication engine. Literal and identifier
placeholders make code that only differs in names or constants compare as equal.
*/

use serde::{Deserialize, Serialize};

use crate::token::{Token, TokenKind};

pub const IDENTIFIER_PLACEHOLDER: &str = "_I";
pub const NUMBER_PLACEHOLDER: &str = "_N";
pub const STRING_PLACEHOLDER: &str = "_S";
pub const CHARACTER_PLACEHOLDER: &str = "_C";

/// Token equivalence switches
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationPolicy {
    /// Numbers, strings and characters compare equal regardless of value
    pub ignore_literals: bool,
    /// Variable, function and type names compare equal regardless of spelling
    pub ignore_identifiers: bool,
}

impl NormalizationPolicy {
    pub fn new(ignore_literals: bool, ignore_identifiers: bool) -> Self {
        Self {
            ignore_literals,
            ignore_identifiers,
        }
    }

    /// Text to emit for `token`, or `None` when the token is never emitted
    pub fn normalize<'t>(&self, token: &'t Token) -> Option<&'t str> {
        if token.kind == TokenKind::Eof || token.generated {
            return None;
        }

        Some(match token.kind {
            TokenKind::Identifier if self.ignore_identifiers => IDENTIFIER_PLACEHOLDER,
            TokenKind::NumericLiteral if self.ignore_literals => NUMBER_PLACEHOLDER,
            TokenKind::StringLiteral if self.ignore_literals => STRING_PLACEHOLDER,
            TokenKind::CharacterLiteral if self.ignore_literals => CHARACTER_PLACEHOLDER,
            _ => token.value.as_str(),
        })
    }
}
