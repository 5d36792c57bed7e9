//! Accuracy evaluation of a preset against a small labelled Hindi corpus.
//!
//! A translation counts as correct when it equals the reference after trimming
//! and lowercasing. Results are tallied overall, per category and per difficulty.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, error};

use crate::translate::engine::TranslationEngine;
use crate::translate::preset::TranslationPreset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Basic,
    Complex,
    Technical,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Basic, Category::Complex, Category::Technical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Basic => "basic",
            Category::Complex => "complex",
            Category::Technical => "technical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// A Hindi sentence with its reference English translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalCase {
    pub hindi: &'static str,
    pub english: &'static str,
    pub category: Category,
    pub difficulty: Difficulty,
}

pub const EVAL_CASES: &[EvalCase] = &[
    EvalCase {
        hindi: "यह एक परीक्षण वाक्य है।",
        english: "This is a test sentence.",
        category: Category::Basic,
        difficulty: Difficulty::Easy,
    },
    EvalCase {
        hindi: "भारत एक सुंदर देश है।",
        english: "India is a beautiful country.",
        category: Category::Basic,
        difficulty: Difficulty::Easy,
    },
    EvalCase {
        hindi: "मुझे पढ़ाई करना पसंद है।",
        english: "I like to study.",
        category: Category::Basic,
        difficulty: Difficulty::Easy,
    },
    EvalCase {
        hindi: "जब मैं छोटा था, मैं हर रोज़ पार्क जाता था।",
        english: "When I was young, I used to go to the park every day.",
        category: Category::Complex,
        difficulty: Difficulty::Medium,
    },
    EvalCase {
        hindi: "यदि आप मेहनत करेंगे, तो आप सफल होंगे।",
        english: "If you work hard, you will succeed.",
        category: Category::Complex,
        difficulty: Difficulty::Medium,
    },
    EvalCase {
        hindi: "कृत्रिम बुद्धिमत्ता भविष्य की तकनीक है।",
        english: "Artificial intelligence is the technology of the future.",
        category: Category::Technical,
        difficulty: Difficulty::Hard,
    },
    EvalCase {
        hindi: "मशीन लर्निंग एल्गोरिदम डेटा से सीखते हैं।",
        english: "Machine learning algorithms learn from data.",
        category: Category::Technical,
        difficulty: Difficulty::Hard,
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub total: usize,
    pub correct: usize,
}

impl Tally {
    /// Percentage of correct cases, 0 when empty.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }

    fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaseResult {
    pub case: EvalCase,
    pub translation: String,
    pub elapsed: Duration,
    pub is_correct: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub overall: Tally,
    pub average_time: Duration,
    pub by_category: BTreeMap<Category, Tally>,
    pub by_difficulty: BTreeMap<Difficulty, Tally>,
    pub failed: Vec<CaseResult>,
}

pub fn matches_reference(translation: &str, reference: &str) -> bool {
    translation.trim().to_lowercase() == reference.trim().to_lowercase()
}

/// Translate one case. Engine errors become a failed result with zero time.
pub async fn evaluate_case(
    engine: &TranslationEngine,
    case: &EvalCase,
    preset: &TranslationPreset,
) -> CaseResult {
    let start = Instant::now();
    match engine.translate_with(case.hindi, preset).await {
        Ok(output) => CaseResult {
            case: *case,
            is_correct: matches_reference(&output.text, case.english),
            translation: output.text,
            elapsed: start.elapsed(),
            error: None,
        },
        Err(e) => {
            error!("Error evaluating case {:?}: {}", case.hindi, e);
            CaseResult {
                case: *case,
                translation: String::new(),
                elapsed: Duration::ZERO,
                is_correct: false,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Run every case sequentially with `preset` and aggregate the results.
pub async fn run_evaluation(
    engine: &TranslationEngine,
    cases: &[EvalCase],
    preset: &TranslationPreset,
) -> EvaluationReport {
    let mut overall = Tally::default();
    let mut total_time = Duration::ZERO;
    let mut by_category: BTreeMap<Category, Tally> =
        Category::ALL.iter().map(|c| (*c, Tally::default())).collect();
    let mut by_difficulty: BTreeMap<Difficulty, Tally> =
        Difficulty::ALL.iter().map(|d| (*d, Tally::default())).collect();
    let mut failed = Vec::new();

    for case in cases {
        let result = evaluate_case(engine, case, preset).await;
        debug!(
            "{} -> {} ({})",
            case.hindi,
            result.translation,
            if result.is_correct { "ok" } else { "mismatch" }
        );

        total_time += result.elapsed;
        overall.record(result.is_correct);
        by_category
            .entry(case.category)
            .or_default()
            .record(result.is_correct);
        by_difficulty
            .entry(case.difficulty)
            .or_default()
            .record(result.is_correct);

        if !result.is_correct {
            failed.push(result);
        }
    }

    let average_time = match u32::try_from(overall.total) {
        Ok(n) if n > 0 => total_time / n,
        _ => Duration::ZERO,
    };

    EvaluationReport {
        overall,
        average_time,
        by_category,
        by_difficulty,
        failed,
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total cases: {}", self.overall.total)?;
        writeln!(f, "Correct: {}", self.overall.correct)?;
        writeln!(f, "Accuracy: {:.2}%", self.overall.accuracy())?;
        writeln!(f, "Average time: {:.3}s", self.average_time.as_secs_f64())?;

        writeln!(f, "\nBy category:")?;
        for (category, tally) in &self.by_category {
            writeln!(
                f,
                "  {}: {}/{} ({:.2}%)",
                category.as_str(),
                tally.correct,
                tally.total,
                tally.accuracy()
            )?;
        }

        writeln!(f, "\nBy difficulty:")?;
        for (difficulty, tally) in &self.by_difficulty {
            writeln!(
                f,
                "  {}: {}/{} ({:.2}%)",
                difficulty.as_str(),
                tally.correct,
                tally.total,
                tally.accuracy()
            )?;
        }

        if !self.failed.is_empty() {
            writeln!(f, "\nFailed cases:")?;
            for result in &self.failed {
                writeln!(f, "  input:    {}", result.case.hindi)?;
                writeln!(f, "  expected: {}", result.case.english)?;
                writeln!(f, "  got:      {}", result.translation)?;
                if let Some(error) = &result.error {
                    writeln!(f, "  error:    {}", error)?;
                }
            }
        }
        Ok(())
    }
}
