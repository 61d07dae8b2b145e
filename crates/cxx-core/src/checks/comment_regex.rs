/*!
# Comment Regular Expression Check

Reports every comment whose complete text, delimiters included, matches a
configured regular expression. `.` also matches line breaks so block comments can
be matched as a whole.
*/

use regex::Regex;

use crate::visitor::{AstEvent, AstVisitor, FileContext};
use crate::{CxxError, Result};

pub const DEFAULT_MESSAGE: &str = "The regular expression matches this comment";

pub struct CommentRegularExpressionCheck {
    regular_expression: String,
    message: String,
    /// `None` when no expression is configured
    pattern: Option<Regex>,
}

impl CommentRegularExpressionCheck {
    /// Compile the check; an empty expression yields an inactive check
    pub fn new(regular_expression: &str, message: &str) -> Result<Self> {
        let pattern = if regular_expression.is_empty() {
            None
        } else {
            let anchored = format!(r"(?s)\A(?:{regular_expression})\z");
            let pattern = Regex::new(&anchored).map_err(|e| CxxError::InvalidRegex {
                pattern: regular_expression.to_string(),
                message: e.to_string(),
            })?;
            Some(pattern)
        };

        Ok(Self {
            regular_expression: regular_expression.to_string(),
            message: message.to_string(),
            pattern,
        })
    }

    pub fn with_default_message(regular_expression: &str) -> Result<Self> {
        Self::new(regular_expression, DEFAULT_MESSAGE)
    }

    pub fn regular_expression(&self) -> &str {
        &self.regular_expression
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }
}

impl AstVisitor for CommentRegularExpressionCheck {
    fn name(&self) -> &'static str {
        "CommentRegularExpression"
    }

    fn visit_event(&mut self, ctx: &mut FileContext, event: &AstEvent) -> Result<()> {
        if let (Some(pattern), AstEvent::Comment(comment)) = (&self.pattern, event) {
            if pattern.is_match(&comment.text) {
                ctx.report_line(self.name(), comment.line, self.message.as_str());
            }
        }
        Ok(())
    }
}
