//! Script generation from a history view
//!
//! Rolled nodes become one call line `Name(Prop='value', ...)`. Unrolled
//! nodes become a commented block containing their children, one extra `#`
//! per nesting level. Output depends only on the view, never on the clock.

use std::fmt::Write as _;

use super::record::{AlgorithmHistory, PropertyHistory};
use super::view::{HistoryView, NodeId};
use crate::property::{Direction, PropertyKind};

/// Whether call lines carry an explicit `Version=` argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionPolicy {
    #[default]
    Never,
    Always,
}

pub struct ScriptBuilder<'a> {
    view: &'a HistoryView,
    versions: VersionPolicy,
}

impl<'a> ScriptBuilder<'a> {
    pub fn new(view: &'a HistoryView) -> Self {
        Self {
            view,
            versions: VersionPolicy::Never,
        }
    }

    pub fn with_versions(mut self, versions: VersionPolicy) -> Self {
        self.versions = versions;
        self
    }

    pub fn build(&self) -> String {
        let mut out = String::new();
        let roots: Vec<NodeId> = self
            .view
            .roots()
            .iter()
            .copied()
            .filter(|&id| self.is_replayable(id))
            .collect();

        for (i, &id) in roots.iter().enumerate() {
            let Ok(record) = self.view.record(id) else {
                continue;
            };
            if self.expands(id) {
                let name = record.name();
                out.push('\n');
                let _ = writeln!(out, "# Child algorithms of {name}");
                self.build_children(&mut out, id, 2);
                let _ = writeln!(out, "# End of child algorithms of {name}");
                if i + 1 < roots.len() {
                    out.push('\n');
                }
            } else {
                out.push_str(&self.call_line(record));
                out.push('\n');
            }
        }
        out
    }

    fn build_children(&self, out: &mut String, id: NodeId, depth: usize) {
        let children = self.view.children(id).unwrap_or_default();
        for &child in children {
            let Ok(record) = self.view.record(child) else {
                continue;
            };
            if !record.is_completed() {
                continue;
            }
            if self.expands(child) {
                let name = record.name();
                let hashes = "#".repeat(depth);
                out.push('\n');
                let _ = writeln!(out, "{hashes} Child algorithms of {name}");
                self.build_children(out, child, depth + 1);
                let _ = writeln!(out, "{hashes} End of child algorithms of {name}");
                out.push('\n');
            } else {
                out.push_str(&self.call_line(record));
                out.push('\n');
            }
        }
    }

    fn is_replayable(&self, id: NodeId) -> bool {
        self.view.record(id).map(|r| r.is_completed()).unwrap_or(false)
    }

    fn expands(&self, id: NodeId) -> bool {
        self.view.is_unrolled(id).unwrap_or(false)
            && !self.view.children(id).unwrap_or_default().is_empty()
    }

    /// `Name(A='x', B=2)` for one record
    pub fn call_line(&self, record: &AlgorithmHistory) -> String {
        let mut args: Vec<String> = record
            .properties()
            .iter()
            .filter(|p| is_scripted(p))
            .map(|p| format!("{}={}", p.name, quote(p)))
            .collect();
        if self.versions == VersionPolicy::Always {
            args.push(format!("Version={}", record.version()));
        }
        format!("{}({})", record.name(), args.join(", "))
    }
}

/// Non-default inputs, plus output dataset names
fn is_scripted(p: &PropertyHistory) -> bool {
    if p.is_default {
        return false;
    }
    !(p.direction == Direction::Output && p.kind != PropertyKind::Dataset)
}

/// Single quotes by default, double quotes around a value holding `'`,
/// `r` prefix for backslashes; escapes only when both quote kinds appear
fn quote(p: &PropertyHistory) -> String {
    let value = &p.value;
    if p.kind.is_numeric() {
        return value.clone();
    }
    let delim = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    if !value.contains(delim) {
        let prefix = if value.contains('\\') { "r" } else { "" };
        return format!("{prefix}{delim}{value}{delim}");
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ExecutionStatus;
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;

    fn prop(name: &str, value: &str, kind: PropertyKind, direction: Direction) -> PropertyHistory {
        PropertyHistory {
            name: name.into(),
            value: value.into(),
            kind,
            direction,
            is_default: false,
        }
    }

    fn s(name: &str, value: &str) -> PropertyHistory {
        prop(name, value, PropertyKind::Str, Direction::Input)
    }

    fn rec(
        name: &str,
        props: Vec<PropertyHistory>,
        children: Vec<Arc<AlgorithmHistory>>,
    ) -> Arc<AlgorithmHistory> {
        rec_status(name, props, children, ExecutionStatus::Completed)
    }

    fn rec_status(
        name: &str,
        props: Vec<PropertyHistory>,
        children: Vec<Arc<AlgorithmHistory>>,
        status: ExecutionStatus,
    ) -> Arc<AlgorithmHistory> {
        Arc::new(AlgorithmHistory::new(
            name,
            1,
            Utc::now(),
            Duration::ZERO,
            status,
            props,
            children,
        ))
    }

    #[test]
    fn single_call_line() {
        let view = HistoryView::new(&[rec("T", vec![s("A", "x"), s("B", "y")], vec![])]);
        assert_eq!(ScriptBuilder::new(&view).build(), "T(A='x', B='y')\n");
    }

    #[test]
    fn childless_unrolled_equals_rolled() {
        let mut view = HistoryView::new(&[rec("T", vec![s("A", "x"), s("B", "y")], vec![])]);
        let rolled = ScriptBuilder::new(&view).build();
        view.unroll_all();
        assert_eq!(ScriptBuilder::new(&view).build(), rolled);
    }

    #[test]
    fn unrolled_children_in_comment_block() {
        let t = rec(
            "T",
            vec![],
            vec![
                rec("C", vec![s("P", "first")], vec![]),
                rec("C", vec![s("P", "second")], vec![]),
            ],
        );
        let mut view = HistoryView::new(&[t]);
        assert_eq!(ScriptBuilder::new(&view).build(), "T()\n");

        view.unroll(0).unwrap();
        assert_eq!(
            ScriptBuilder::new(&view).build(),
            "\n# Child algorithms of T\nC(P='first')\nC(P='second')\n# End of child algorithms of T\n"
        );
    }

    #[test]
    fn nested_blocks_add_hashes() {
        let inner = rec("B", vec![], vec![rec("C", vec![], vec![])]);
        let outer = rec("A", vec![], vec![inner]);
        let mut view = HistoryView::new(&[outer, rec("Z", vec![], vec![])]);
        view.unroll_all();

        let expected = "\n# Child algorithms of A\n\
                        \n## Child algorithms of B\nC()\n## End of child algorithms of B\n\n\
                        # End of child algorithms of A\n\
                        \nZ()\n";
        assert_eq!(ScriptBuilder::new(&view).build(), expected);
    }

    #[test]
    fn quoting_rules() {
        let props = vec![
            prop("Factor", "2.5", PropertyKind::Float, Direction::Input),
            prop("Flag", "1", PropertyKind::Bool, Direction::Input),
            s("Path", r"C:\data\run.nxs"),
            prop("Values", "1,2", PropertyKind::FloatArray, Direction::Input),
            prop("OutputDataset", "out", PropertyKind::Dataset, Direction::Output),
            prop("Result", "6", PropertyKind::Float, Direction::Output),
        ];
        let view = HistoryView::new(&[rec("T", props, vec![])]);
        assert_eq!(
            ScriptBuilder::new(&view).build(),
            "T(Factor=2.5, Flag=1, Path=r'C:\\data\\run.nxs', Values='1,2', OutputDataset='out')\n"
        );
    }

    #[test]
    fn embedded_quotes_stay_parseable() {
        let view = HistoryView::new(&[rec(
            "Scale",
            vec![
                s("Title", "it's"),
                s("Path", r"C:\it's"),
                s("Mixed", r#"a'b"c"#),
            ],
            vec![],
        )]);
        assert_eq!(
            ScriptBuilder::new(&view).build(),
            "Scale(Title=\"it's\", Path=r\"C:\\it's\", Mixed='a\\'b\"c')\n"
        );
    }

    #[test]
    fn defaults_are_skipped_and_version_optional() {
        let mut default_prop = s("Mode", "Fast");
        default_prop.is_default = true;
        let view = HistoryView::new(&[rec("T", vec![default_prop, s("A", "x")], vec![])]);

        assert_eq!(ScriptBuilder::new(&view).build(), "T(A='x')\n");
        assert_eq!(
            ScriptBuilder::new(&view)
                .with_versions(VersionPolicy::Always)
                .build(),
            "T(A='x', Version=1)\n"
        );
    }

    #[test]
    fn failed_and_cancelled_records_are_skipped() {
        let view = HistoryView::new(&[
            rec("Good", vec![], vec![]),
            rec_status("Bad", vec![], vec![], ExecutionStatus::Failed),
            rec_status("Stopped", vec![], vec![], ExecutionStatus::Cancelled),
        ]);
        assert_eq!(ScriptBuilder::new(&view).build(), "Good()\n");
    }

    #[test]
    fn toggle_twice_is_idempotent() {
        let t = rec("T", vec![], vec![rec("C", vec![s("P", "a")], vec![])]);
        let mut view = HistoryView::new(&[t, rec("U", vec![], vec![])]);
        let original = ScriptBuilder::new(&view).build();
        view.toggle(0).unwrap();
        assert_ne!(ScriptBuilder::new(&view).build(), original);
        view.toggle(0).unwrap();
        assert_eq!(ScriptBuilder::new(&view).build(), original);
    }
}
