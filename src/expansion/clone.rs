//! Template cloning: rebuild a test case against a bound scope.
//!
//! The clone is an explicit recursive builder keyed on the body-node
//! variant, constructing every node field by field. Keyword names,
//! arguments, assignment targets, and tags pass through substitution;
//! timeouts and source lines are preserved verbatim; control blocks get
//! their `condition` and `values` substituted and their child bodies cloned
//! recursively, preserving nesting depth and sibling order. The `Examples:`
//! pseudo-call itself is dropped from the output wherever it appears.
//!
//! The same template is cloned once per selected row, so the result shares
//! no structure with the template.

use crate::expansion::is_examples_call;
use crate::model::{BodyNode, ControlBlock, KeywordCall, TestCase};
use crate::variables::{resolve_list, resolve_scalar, Variables};

/// A concrete test case plus the placeholder names that could not be
/// resolved while producing it. The caller logs the names; they never abort
/// the expansion.
#[derive(Debug, Clone)]
pub struct ClonedCase {
    pub case: TestCase,
    pub unresolved: Vec<String>,
}

/// Produce one concrete test case from `template` against the bound scope.
pub fn clone_case(template: &TestCase, vars: &Variables) -> ClonedCase {
    let mut unresolved = Vec::new();

    let name = resolve_scalar(&template.name, vars);
    merge(&mut unresolved, name.unresolved);
    let tags = resolve_list(&template.tags, vars);
    merge(&mut unresolved, tags.unresolved);
    let body = clone_body(&template.body, vars, &mut unresolved);

    ClonedCase {
        case: TestCase {
            name: name.text,
            tags: tags.items,
            setup: template.setup.clone(),
            teardown: template.teardown.clone(),
            body,
            lineno: template.lineno,
        },
        unresolved,
    }
}

fn clone_body(body: &[BodyNode], vars: &Variables, unresolved: &mut Vec<String>) -> Vec<BodyNode> {
    body.iter()
        .filter_map(|node| match node {
            BodyNode::Keyword(kw) if is_examples_call(kw) => None,
            BodyNode::Keyword(kw) => Some(BodyNode::Keyword(clone_keyword(kw, vars, unresolved))),
            BodyNode::Control(block) => {
                Some(BodyNode::Control(clone_control(block, vars, unresolved)))
            }
        })
        .collect()
}

fn clone_keyword(kw: &KeywordCall, vars: &Variables, unresolved: &mut Vec<String>) -> KeywordCall {
    let name = resolve_scalar(&kw.name, vars);
    merge(unresolved, name.unresolved);
    let args = resolve_list(&kw.args, vars);
    merge(unresolved, args.unresolved);
    let assign = resolve_list(&kw.assign, vars);
    merge(unresolved, assign.unresolved);
    let tags = resolve_list(&kw.tags, vars);
    merge(unresolved, tags.unresolved);

    KeywordCall {
        name: name.text,
        args: args.items,
        assign: assign.items,
        tags: tags.items,
        timeout: kw.timeout.clone(),
        lineno: kw.lineno,
    }
}

fn clone_control(
    block: &ControlBlock,
    vars: &Variables,
    unresolved: &mut Vec<String>,
) -> ControlBlock {
    let condition = block.condition.as_ref().map(|cond| {
        let res = resolve_scalar(cond, vars);
        merge(unresolved, res.unresolved);
        res.text
    });
    let values = resolve_list(&block.values, vars);
    merge(unresolved, values.unresolved);

    ControlBlock {
        kind: block.kind,
        condition,
        values: values.items,
        body: clone_body(&block.body, vars, unresolved),
    }
}

fn merge(into: &mut Vec<String>, names: Vec<String>) {
    for name in names {
        if !into.iter().any(|seen| seen == &name) {
            into.push(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ControlKind;

    fn scope(entries: &[(&str, &str)]) -> Variables {
        let mut vars = Variables::new();
        for (name, value) in entries {
            vars.set(*name, *value);
        }
        vars
    }

    fn template_with_nesting() -> TestCase {
        // FOR -> IF -> keyword, three levels deep
        let innermost = KeywordCall::new("Log").with_args(["${name}"]);
        let level3 = ControlBlock::new(ControlKind::If)
            .with_condition("'${name}' == 'Joe'")
            .with_body(vec![BodyNode::Keyword(innermost)]);
        let level2 = ControlBlock::new(ControlKind::For)
            .with_values(["${name}", "static"])
            .with_body(vec![BodyNode::Control(level3)]);

        let mut tc = TestCase::new("Hello for ${name}");
        tc.push(BodyNode::Keyword(
            KeywordCall::new("Examples:").with_args(["name", "--", "Joe"]),
        ));
        tc.push(BodyNode::Control(level2));
        tc
    }

    #[test]
    fn nesting_depth_and_sibling_order_preserved() {
        let template = template_with_nesting();
        let vars = scope(&[("name", "Joe")]);
        let cloned = clone_case(&template, &vars);

        assert_eq!(cloned.case.name, "Hello for Joe");
        // pseudo-call dropped, one control block left
        assert_eq!(cloned.case.body.len(), 1);
        let BodyNode::Control(level2) = &cloned.case.body[0] else {
            panic!("expected control block at top level");
        };
        assert_eq!(level2.kind, ControlKind::For);
        assert_eq!(level2.values, vec!["Joe", "static"]);
        let BodyNode::Control(level3) = &level2.body[0] else {
            panic!("expected nested control block");
        };
        assert_eq!(level3.condition.as_deref(), Some("'Joe' == 'Joe'"));
        let BodyNode::Keyword(innermost) = &level3.body[0] else {
            panic!("expected keyword at depth 3");
        };
        assert_eq!(innermost.name, "Log");
        assert_eq!(innermost.args, vec!["Joe"]);
    }

    #[test]
    fn keyword_fields_substituted_metadata_verbatim() {
        let mut tc = TestCase::new("t ${n}");
        let mut kw = KeywordCall::new("Do ${n}")
            .with_args(["arg ${n}"])
            .with_assign(["${result_${n}}"]);
        kw.tags = vec!["tag-${n}".into()];
        kw.timeout = Some("10s".into());
        kw.lineno = Some(42);
        tc.push(BodyNode::Keyword(kw));

        let vars = scope(&[("n", "1")]);
        let cloned = clone_case(&tc, &vars);
        let BodyNode::Keyword(out) = &cloned.case.body[0] else {
            panic!("expected keyword");
        };
        assert_eq!(out.name, "Do 1");
        assert_eq!(out.args, vec!["arg 1"]);
        // single-pass substitution: the inner placeholder resolves, the
        // synthesized outer name is not re-scanned
        assert_eq!(out.assign, vec!["${result_1}"]);
        assert_eq!(out.tags, vec!["tag-1"]);
        assert_eq!(out.timeout.as_deref(), Some("10s"));
        assert_eq!(out.lineno, Some(42));
    }

    #[test]
    fn setup_and_teardown_carried_verbatim() {
        let mut tc = TestCase::new("t");
        tc.setup = Some(KeywordCall::new("Open").with_args(["${url}"]));
        tc.teardown = Some(KeywordCall::new("Close"));
        let cloned = clone_case(&tc, &scope(&[("url", "http://x")]));
        // setup args intentionally not substituted; carried as authored
        assert_eq!(cloned.case.setup.as_ref().unwrap().args, vec!["${url}"]);
        assert_eq!(cloned.case.teardown.as_ref().unwrap().name, "Close");
    }

    #[test]
    fn unresolved_names_collected_without_aborting() {
        let mut tc = TestCase::new("t ${known}");
        tc.push(BodyNode::Keyword(
            KeywordCall::new("Log").with_args(["${missing}", "${known}"]),
        ));
        let cloned = clone_case(&tc, &scope(&[("known", "v")]));
        assert_eq!(cloned.case.name, "t v");
        assert_eq!(cloned.unresolved, vec!["missing".to_string()]);
        let BodyNode::Keyword(out) = &cloned.case.body[0] else {
            panic!("expected keyword");
        };
        assert_eq!(out.args, vec!["${missing}", "v"]);
    }

    #[test]
    fn pseudo_call_dropped_at_any_depth() {
        let mut tc = TestCase::new("t");
        let block = ControlBlock::new(ControlKind::If)
            .with_condition("True")
            .with_body(vec![
                BodyNode::Keyword(KeywordCall::new("examples:").with_args(["h", "--", "v"])),
                BodyNode::Keyword(KeywordCall::new("Log")),
            ]);
        tc.push(BodyNode::Control(block));
        let cloned = clone_case(&tc, &Variables::new());
        let BodyNode::Control(out) = &cloned.case.body[0] else {
            panic!("expected control block");
        };
        assert_eq!(out.body.len(), 1);
        assert_eq!(out.body[0].as_keyword().unwrap().name, "Log");
    }
}
