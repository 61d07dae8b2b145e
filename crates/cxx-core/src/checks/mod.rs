/*!
# Rule Checks

Visitors reporting rule violations through `FileContext`.
*/

pub mod comment_regex;

pub use comment_regex::CommentRegularExpressionCheck;
