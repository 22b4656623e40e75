//! Arithmetic calculator tool.

use super::Tool;
use crate::config::Prompts;
use crate::error::{MathmateError, Result};
use crate::model::{ChatModel, ChatRequest, ModelReply};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tracing::{debug, instrument};

pub const NAME: &str = "Calculator";

const DESCRIPTION: &str =
    "A tool for answering math-related questions. Only input mathematical expression needs to be provided.";

static TIMES_BETWEEN_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\s*[xX]\s*(\d)").expect("Invalid regex"));
static GROUPED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}(?:,\d{3})+\b").expect("Invalid regex"));
static FUNCTION_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_]\w*\s*\(").expect("Invalid regex"));
static FENCED_EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:text)?\s*(.*?)\s*```").expect("Invalid regex"));

/// Evaluates arithmetic expressions.
///
/// When a model is attached, input that does not parse as an expression is
/// first translated into one by the model.
pub struct Calculator {
    translator: Option<(Arc<dyn ChatModel>, String)>,
}

impl Calculator {
    /// A calculator that only accepts literal expressions.
    pub fn new() -> Self {
        Self { translator: None }
    }

    /// Attach a model and the template (with `{{question}}`) used to translate word problems.
    pub fn with_translator(mut self, model: Arc<dyn ChatModel>, template: &str) -> Self {
        self.translator = Some((model, template.to_string()));
        self
    }

    async fn translate(&self, model: &dyn ChatModel, template: &str, question: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        let prompt = Prompts::render(template, &vars);

        let text = match model.complete(&ChatRequest::prompt(prompt)).await? {
            ModelReply::Text(text) => text,
            ModelReply::ToolCalls { .. } => {
                return Err(MathmateError::tool(NAME, "model answered with a tool call"))
            }
        };

        let text = text.trim();
        if text.starts_with("Answer:") {
            return Ok(text.to_string());
        }

        let expression = FENCED_EXPRESSION
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or(text);
        debug!("Translated '{}' into '{}'", question, expression);

        let value = evaluate_expression(expression)?;
        Ok(format!("Answer: {}", format_number(value)))
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for Calculator {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    #[instrument(skip(self))]
    async fn invoke(&self, input: &str) -> Result<String> {
        match evaluate_expression(input) {
            Ok(value) => Ok(format!("Answer: {}", format_number(value))),
            Err(e) => match &self.translator {
                Some((model, template)) => {
                    debug!("Not a literal expression ({}), asking the model", e);
                    self.translate(model.as_ref(), template, input).await
                }
                None => Err(e),
            },
        }
    }
}

/// Rewrite common notations into the syntax `meval` understands.
fn normalize_expression(input: &str) -> String {
    let mut expr = input
        .trim()
        .trim_matches('`')
        .trim()
        .trim_end_matches(['=', '?'])
        .replace(['×', '·', '∗'], "*")
        .replace('÷', "/")
        .replace('−', "-")
        .replace("**", "^");

    // Matches can't overlap, so "2x3x4" needs more than one pass.
    loop {
        let next = TIMES_BETWEEN_DIGITS.replace_all(&expr, "$1*$2").into_owned();
        if next == expr {
            break;
        }
        expr = next;
    }

    // Inside a function call a comma separates arguments, as in max(2,100).
    if !FUNCTION_CALL.is_match(&expr) {
        expr = GROUPED_NUMBER
            .replace_all(&expr, |caps: &regex::Captures| caps[0].replace(',', ""))
            .into_owned();
    }

    expr.trim().to_string()
}

/// Evaluate an arithmetic expression.
pub fn evaluate_expression(input: &str) -> Result<f64> {
    let expr = normalize_expression(input);
    if expr.is_empty() {
        return Err(MathmateError::tool(NAME, "empty expression"));
    }

    let value = meval::eval_str(&expr)
        .map_err(|e| MathmateError::tool(NAME, format!("cannot evaluate '{}': {}", expr, e)))?;

    if !value.is_finite() {
        return Err(MathmateError::tool(
            NAME,
            format!("'{}' does not evaluate to a finite number", expr),
        ));
    }
    Ok(value)
}

/// Significant digits kept in non-integral answers.
const SIGNIFICANT_DIGITS: usize = 12;

/// Print integral values without a fractional part, others rounded to
/// [`SIGNIFICANT_DIGITS`]. Very large or very small magnitudes use exponent notation.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }

    let rounded: f64 = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value)
        .parse()
        .unwrap_or(value);
    if rounded.abs() >= 1e15 || rounded.abs() < 1e-6 {
        format!("{:e}", rounded)
    } else {
        format!("{}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::ScriptedModel;

    #[test]
    fn test_normalize_expression() {
        assert_eq!(normalize_expression("2×25"), "2*25");
        assert_eq!(normalize_expression("2 x 3 x 4"), "2*3*4");
        assert_eq!(normalize_expression("2 ** 10 ="), "2 ^ 10");
        assert_eq!(normalize_expression("1,000,000 / 4"), "1000000 / 4");
        assert_eq!(normalize_expression("`12 ÷ 4`"), "12 / 4");
    }

    #[test]
    fn test_fruit_problem_total() {
        assert_eq!(evaluate_expression("5-2 + 7-3 + 12 + 2*25").unwrap(), 69.0);
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        let err = evaluate_expression("1/0").unwrap_err();
        assert!(matches!(err, MathmateError::Tool { ref name, .. } if name == NAME));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(69.0), "69");
        assert_eq!(format_number(-4.0), "-4");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(1e300), "1e300");
        assert_eq!(format_number(1.0 / 3e12), "3.33333333333e-13");
        assert_eq!(format_number(-2.5e-9), "-2.5e-9");
    }

    #[test]
    fn test_function_arguments_keep_their_commas() {
        assert_eq!(normalize_expression("max(2,100)"), "max(2,100)");
        assert_eq!(evaluate_expression("max(2,100)").unwrap(), 100.0);
        assert_eq!(evaluate_expression("(1,000 + 24) / 2").unwrap(), 512.0);
    }

    #[tokio::test]
    async fn test_extreme_magnitudes_stay_finite_and_nonzero() {
        let calculator = Calculator::new();
        assert_eq!(calculator.invoke("10^300").await.unwrap(), "Answer: 1e300");
        assert_eq!(
            calculator.invoke("1/3000000000000").await.unwrap(),
            "Answer: 3.33333333333e-13"
        );
        assert_eq!(calculator.invoke("max(2,100)").await.unwrap(), "Answer: 100");
    }

    #[tokio::test]
    async fn test_literal_expression_skips_model() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let calculator = Calculator::new().with_translator(model.clone(), "{{question}}");

        let answer = calculator.invoke("(5 - 2) + (7 - 3) + 12 + 2 * 25").await.unwrap();
        assert_eq!(answer, "Answer: 69");
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_word_problem_is_translated() {
        let model = Arc::new(ScriptedModel::new(vec![ModelReply::Text(
            "```text\n(5 - 2) + (7 - 3) + 12 + 2 * 25\n```".to_string(),
        )]));
        let calculator = Calculator::new().with_translator(model.clone(), "Q: {{question}}");

        let answer = calculator
            .invoke("total fruit after eating 2 of 5 bananas, giving 3 of 7 grapes, buying 12 apples and 2 packs of 25 blueberries")
            .await
            .unwrap();

        assert_eq!(answer, "Answer: 69");
        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].last_user_text().unwrap().starts_with("Q: total fruit"));
        assert!(requests[0].tools.is_empty());
    }

    #[tokio::test]
    async fn test_without_translator_errors_propagate() {
        let calculator = Calculator::new();
        let err = calculator.invoke("how many apples?").await.unwrap_err();
        assert!(err.to_string().contains("Calculator"));
    }
}
