//! Expansion orchestration over suite trees.
//!
//! The expander scans a suite's tests for the `Examples:` pseudo-call,
//! drives the table -> selection -> per-row cloning pipeline for each
//! template it finds, and replaces the template with the generated concrete
//! cases in the template's original position. Child suites are processed
//! recursively, depth-unbounded.
//!
//! Two trigger paths exist. The automatic path runs once at suite start when
//! `autoexpand` is set and treats a suite with no templates as a valid
//! no-op. The explicit path is for deferred expansion (example data supplied
//! during suite setup): it accepts per-call selection overrides and fails
//! with `NoTableFound` when the entire target scope contains nothing to
//! expand.
//!
//! Expansion is strictly sequential: one variable frame is open at a time,
//! and the whole transformation completes before any test executes.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{unspanned, ErrorReporting, ExpandError, ReportContext, SourceContext};
use crate::expansion::clone::clone_case;
use crate::expansion::select::{select_rows, RandomSpec, SelectionPolicy};
use crate::expansion::table::build_table;
use crate::expansion::is_examples_call;
use crate::model::{Suite, TestCase};
use crate::variables::{resolve_list, Variables};

/// Construction-time options for an [`Expander`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpanderConfig {
    /// Expand automatically at suite start. Turn off to defer expansion
    /// until example data has been defined (suite setup), then trigger
    /// [`Expander::expand_examples`] explicitly.
    pub autoexpand: bool,
    /// Global cap on generated cases per template, overridable per call.
    pub max_examples: Option<i64>,
    /// Row sampling behavior, overridable per call.
    pub random: RandomSpec,
    /// Seed for the sampling RNG. Unseeded expanders draw from entropy;
    /// tests seed for reproducible selections.
    pub seed: Option<u64>,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            autoexpand: true,
            max_examples: None,
            random: RandomSpec::Off,
            seed: None,
        }
    }
}

/// Accepts the usual lenient spellings for boolean options: `false`, `no`,
/// `off`, `f`, and `0` (any case) disable, anything else enables.
pub fn parse_boolish(text: &str) -> bool {
    !matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "false" | "no" | "off" | "f" | "0"
    )
}

// The orchestrator's per-suite state machine. Automatic expansion moves
// Scan -> Done and never reruns; explicit triggers are always honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scan,
    Done,
}

/// The expansion orchestrator.
#[derive(Debug)]
pub struct Expander {
    autoexpand: bool,
    max_examples: Option<usize>,
    random: RandomSpec,
    rng: Xoshiro256PlusPlus,
    state: State,
}

impl Expander {
    /// Validate the configuration and build an expander.
    pub fn new(config: ExpanderConfig) -> Result<Self, ExpandError> {
        let reporter = ReportContext::for_config();
        let max_examples = validate_cap(config.max_examples, &reporter)?;
        let rng = match config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        Ok(Self {
            autoexpand: config.autoexpand,
            max_examples,
            random: config.random,
            rng,
            state: State::Scan,
        })
    }

    /// Automatic trigger. Runs the full expansion once when `autoexpand` is
    /// set; a scope without templates is a no-op, not an error.
    pub fn on_suite_start(
        &mut self,
        suite: &mut Suite,
        vars: &mut Variables,
    ) -> Result<(), ExpandError> {
        if !self.autoexpand || self.state == State::Done {
            return Ok(());
        }
        let policy = SelectionPolicy::new(self.max_examples, self.random);
        let expanded = self.expand_suite(suite, vars, &policy)?;
        self.state = State::Done;
        debug!(suite = %suite.name, templates = expanded, "automatic expansion finished");
        Ok(())
    }

    /// Explicit trigger with per-call selection overrides. Returns the
    /// number of templates expanded; zero templates in the entire target
    /// scope is an error on this path, because the caller asked for
    /// expansion to occur.
    pub fn expand_examples(
        &mut self,
        suite: &mut Suite,
        vars: &mut Variables,
        max_examples: Option<i64>,
        random: Option<RandomSpec>,
    ) -> Result<usize, ExpandError> {
        let reporter = ReportContext::for_config();
        let max_count = match max_examples {
            Some(_) => validate_cap(max_examples, &reporter)?,
            None => self.max_examples,
        };
        let policy = SelectionPolicy::new(max_count, random.unwrap_or(self.random));

        let expanded = self.expand_suite(suite, vars, &policy)?;
        self.state = State::Done;
        if expanded == 0 {
            let reporter =
                ReportContext::new(SourceContext::fallback(&suite.name), "expansion");
            return Err(reporter.no_table_found(&suite.name));
        }
        debug!(suite = %suite.name, templates = expanded, "explicit expansion finished");
        Ok(expanded)
    }

    // Expand one suite and recurse into its children. Returns the number of
    // templates expanded. On error the suite's test list is left exactly as
    // it was: the replacement list is only installed once every test in the
    // suite has been processed.
    fn expand_suite(
        &mut self,
        suite: &mut Suite,
        vars: &mut Variables,
        policy: &SelectionPolicy,
    ) -> Result<usize, ExpandError> {
        let mut expanded = 0;
        let mut replacement: Vec<TestCase> = Vec::with_capacity(suite.tests.len());

        for tc in &suite.tests {
            match self.expand_case(tc, vars, policy)? {
                Some(cases) => {
                    expanded += 1;
                    replacement.extend(cases);
                }
                None => replacement.push(tc.clone()),
            }
        }
        suite.tests = replacement;

        for child in &mut suite.suites {
            expanded += self.expand_suite(child, vars, policy)?;
        }
        Ok(expanded)
    }

    // Expand one test case if it is a template. `Ok(None)` means the case
    // carries no `Examples:` call and passes through unchanged.
    fn expand_case(
        &mut self,
        template: &TestCase,
        vars: &mut Variables,
        policy: &SelectionPolicy,
    ) -> Result<Option<Vec<TestCase>>, ExpandError> {
        let Some(call) = template
            .body
            .iter()
            .filter_map(|node| node.as_keyword())
            .find(|kw| is_examples_call(kw))
        else {
            return Ok(None);
        };

        // The argument list itself may reference ambient variables (example
        // data defined during suite setup), resolved in ignore-errors mode.
        let args = resolve_list(&call.args, vars);
        if !args.unresolved.is_empty() {
            debug!(
                test = %template.name,
                unresolved = ?args.unresolved,
                "table arguments reference unbound variables"
            );
        }

        // Spans in table errors index into the effective (resolved) argument
        // list, so the reporter renders that same text.
        let reporter = ReportContext::for_template(&template.name, &args.items);
        let table = build_table(&args.items, &reporter)?;
        let rows = select_rows(&table.records, policy, &mut self.rng);

        vars.start_frame();
        let mut cases = Vec::with_capacity(rows.len());
        for row in &rows {
            // Every header is re-bound for every row; a previous row's
            // values never survive into the next substitution.
            vars.bind_all(row.iter());
            let outcome = clone_case(template, vars);
            if !outcome.unresolved.is_empty() {
                warn!(
                    test = %outcome.case.name,
                    unresolved = ?outcome.unresolved,
                    "placeholders left unresolved; best-effort text kept"
                );
            }
            cases.push(outcome.case);
        }
        vars.end_frame();

        debug!(
            template = %template.name,
            rows = table.records.len(),
            selected = rows.len(),
            "template expanded"
        );
        Ok(Some(cases))
    }
}

fn validate_cap(
    raw: Option<i64>,
    reporter: &ReportContext,
) -> Result<Option<usize>, ExpandError> {
    match raw {
        None => Ok(None),
        Some(n) if n < 0 => Err(reporter.negative_count(n, unspanned())),
        Some(n) => Ok(Some(n as usize)),
    }
}
