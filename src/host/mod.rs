//! Terminal host for the picker engine
//!
//! The engine renders nothing; this module is the presentation layer used by
//! the `treepick` binary. Each screen becomes one select prompt: the rows
//! first (up-item, containers with a trailing `/`, checkboxes on selectable
//! nodes), then the actions (commit, sort, reload, cancel). ESC goes back.
//!
//! Prompts and messages go through [`UserInput`] and [`OutputWriter`], so the
//! whole loop runs unattended in tests with [`mock::ScriptedInput`] and
//! [`output::BufferedWriter`].

pub mod error;
pub mod input;
pub mod mock;
pub mod output;

pub use error::{HostError, Result};
pub use input::{DialoguerInput, InputError, UserInput};
pub use output::{OutputWriter, StdoutWriter};

use tracing::debug;

use crate::engine::{
    Activation, EngineState, ListItem, PickerEngine, PickerError, PickerObserver, Screen,
    ScrollOffset, SortDirection,
};
use crate::node::{Node, NodeId, SortField};
use crate::provider::NodeProvider;

/// How an interactive run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOutcome {
    /// Picked nodes, in pick order
    Committed(Vec<Node>),
    /// Dismissed without a result
    Cancelled,
}

/// Host presentation options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOptions {
    /// Base label of the commit action
    pub commit_label: String,
    /// Fields offered by the sort action; empty hides it
    pub sort_fields: Vec<SortField>,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            commit_label: "Select".to_string(),
            sort_fields: Vec::new(),
        }
    }
}

impl HostOptions {
    /// Options for browsing files
    #[must_use]
    pub fn for_files() -> Self {
        Self {
            sort_fields: vec![SortField::Name, SortField::Modified, SortField::Size],
            ..Self::default()
        }
    }

    /// Options for browsing a JSON tree
    #[must_use]
    pub fn for_json() -> Self {
        Self {
            sort_fields: vec![SortField::Title, SortField::HasChildren],
            ..Self::default()
        }
    }
}

/// Observer reporting engine signals through an [`OutputWriter`]
pub struct ConsoleObserver<'a, W: OutputWriter + ?Sized> {
    output: &'a W,
}

impl<'a, W: OutputWriter + ?Sized> ConsoleObserver<'a, W> {
    #[must_use]
    pub const fn new(output: &'a W) -> Self {
        Self { output }
    }
}

impl<W: OutputWriter + ?Sized> PickerObserver for ConsoleObserver<'_, W> {
    fn on_access_denied(&mut self, node: &NodeId, reason: &str) {
        self.output.warning(&format!("Cannot open {node}: {reason}"));
    }
}

/// One line of the select prompt
enum Entry {
    Row(ListItem),
    Commit,
    Sort,
    Reload,
    Cancel,
}

/// Interactive loop driving a [`PickerEngine`]
pub struct PickerHost<'a, I: UserInput + ?Sized, W: OutputWriter + ?Sized> {
    input: &'a I,
    output: &'a W,
    options: HostOptions,
}

impl<'a, I: UserInput + ?Sized, W: OutputWriter + ?Sized> PickerHost<'a, I, W> {
    #[must_use]
    pub const fn new(input: &'a I, output: &'a W, options: HostOptions) -> Self {
        Self {
            input,
            output,
            options,
        }
    }

    /// Browse until the user commits or dismisses the picker
    ///
    /// Opens the engine first if needed. Recoverable engine errors (access
    /// denied, unselectable node, depth limit) are reported and the loop
    /// continues on the same screen.
    ///
    /// # Errors
    ///
    /// Returns `HostError::Input` if a prompt fails and `HostError::Picker`
    /// if the engine cannot be opened.
    pub fn run<P, O>(&self, engine: &mut PickerEngine<P, O>) -> Result<HostOutcome>
    where
        P: NodeProvider,
        O: PickerObserver,
    {
        if engine.state() == EngineState::Idle {
            engine.open()?;
        }

        loop {
            let Some(screen) = engine.screen().cloned() else {
                return Ok(HostOutcome::Cancelled);
            };
            self.render_header(&screen);

            let entries = self.entries(engine, &screen);
            let lines: Vec<String> = entries.iter().map(|e| self.line(engine, e)).collect();
            let default = screen.scroll.first_visible.min(lines.len().saturating_sub(1));

            let Some(index) = self
                .input
                .prompt_select(&screen.header.label, &lines, Some(default))?
            else {
                // ESC on an empty stack closes the picker
                if self.recover(engine.go_back().map(|screen| screen.is_none()))? == Some(true) {
                    return Ok(HostOutcome::Cancelled);
                }
                continue;
            };

            match entries.get(index) {
                Some(Entry::Row(row)) => {
                    engine.set_scroll(ScrollOffset::at(index));
                    if let Some(outcome) = self.on_row(engine, row)? {
                        return Ok(outcome);
                    }
                }
                Some(Entry::Commit) => {
                    if let Some(picked) = self.recover(engine.commit())? {
                        return Ok(HostOutcome::Committed(picked));
                    }
                }
                Some(Entry::Sort) => self.choose_sort(engine)?,
                Some(Entry::Reload) => {
                    self.recover(engine.reload().map(|_| ()))?;
                }
                Some(Entry::Cancel) => {
                    if self.confirm_discard(engine.selection().len())? {
                        engine.cancel()?;
                        return Ok(HostOutcome::Cancelled);
                    }
                }
                None => self.output.warning(&format!("No entry at {index}")),
            }
        }
    }

    fn render_header(&self, screen: &Screen) {
        let header = &screen.header;
        if header.secondary_label.is_empty() {
            self.output.info(&header.label);
        } else {
            self.output
                .info(&format!("{}  {}", header.label, header.secondary_label));
        }
    }

    fn entries<P: NodeProvider, O: PickerObserver>(
        &self,
        engine: &PickerEngine<P, O>,
        screen: &Screen,
    ) -> Vec<Entry> {
        let mut entries: Vec<Entry> = screen.rows().into_iter().map(Entry::Row).collect();
        if engine.can_commit() {
            entries.push(Entry::Commit);
        }
        if !self.options.sort_fields.is_empty() {
            entries.push(Entry::Sort);
        }
        entries.push(Entry::Reload);
        entries.push(Entry::Cancel);
        entries
    }

    fn line<P: NodeProvider, O: PickerObserver>(
        &self,
        engine: &PickerEngine<P, O>,
        entry: &Entry,
    ) -> String {
        match entry {
            Entry::Row(ListItem::Up(up)) => with_secondary(
                format!("    {}", up.description.label),
                &up.description.secondary_label,
            ),
            Entry::Row(ListItem::Container(node) | ListItem::Leaf(node)) => {
                let marker = match (node.selectable, engine.is_picked(&node.id)) {
                    (false, _) => "   ",
                    (true, true) => "[x]",
                    (true, false) => "[ ]",
                };
                let slash = if node.is_container() { "/" } else { "" };
                with_secondary(
                    format!("{marker} {}{slash}", node.label()),
                    &node.description.secondary_label,
                )
            }
            Entry::Commit => engine.commit_label(&self.options.commit_label),
            Entry::Sort => match engine.sort() {
                Some(policy) => format!(
                    "Sort: {} ({})",
                    policy.field,
                    direction_name(policy.direction)
                ),
                None => "Sort: off".to_string(),
            },
            Entry::Reload => "Reload".to_string(),
            Entry::Cancel => "Cancel".to_string(),
        }
    }

    fn on_row<P: NodeProvider, O: PickerObserver>(
        &self,
        engine: &mut PickerEngine<P, O>,
        row: &ListItem,
    ) -> Result<Option<HostOutcome>> {
        let activation = match row {
            ListItem::Container(node) if node.selectable => {
                let pick = if engine.is_picked(&node.id) { "Unpick" } else { "Pick" };
                let actions = ["Open".to_string(), pick.to_string()];
                match self.input.prompt_select(node.label(), &actions, Some(0))? {
                    Some(0) => self.recover(engine.activate(row))?,
                    Some(_) => self.recover(
                        engine
                            .toggle(node)
                            .map(|picked| Activation::Toggled { picked }),
                    )?,
                    None => None,
                }
            }
            _ => self.recover(engine.activate(row))?,
        };

        debug!(?activation, "row activated");
        Ok(match activation {
            Some(Activation::Committed(picked)) => Some(HostOutcome::Committed(picked)),
            _ => None,
        })
    }

    fn choose_sort<P: NodeProvider, O: PickerObserver>(
        &self,
        engine: &mut PickerEngine<P, O>,
    ) -> Result<()> {
        let fields = &self.options.sort_fields;
        let mut lines: Vec<String> = fields.iter().map(ToString::to_string).collect();
        lines.push("off".to_string());

        if let Some(index) = self.input.prompt_select("Sort by", &lines, None)? {
            match fields.get(index) {
                Some(field) => {
                    self.recover(engine.cycle_sort(*field))?;
                }
                None => {
                    self.recover(engine.set_sort(None))?;
                }
            }
        }
        Ok(())
    }

    fn confirm_discard(&self, picked: usize) -> Result<bool> {
        if picked == 0 {
            return Ok(true);
        }
        let prompt = format!("Discard {picked} picked item(s)?");
        Ok(self.input.prompt_confirm(&prompt, false)? == Some(true))
    }

    /// Turn recoverable engine errors into messages
    fn recover<T>(&self, result: std::result::Result<T, PickerError>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            // already reported by the observer
            Err(PickerError::AccessDenied { .. }) => Ok(None),
            Err(
                e @ (PickerError::NotSelectable(_)
                | PickerError::EmptySelection
                | PickerError::NavigationBounds { .. }
                | PickerError::AtBoundary
                | PickerError::UnknownItem(_)),
            ) => {
                self.output.warning(&e.to_string());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn with_secondary(line: String, secondary: &str) -> String {
    if secondary.is_empty() {
        line
    } else {
        format!("{line}  {secondary}")
    }
}

const fn direction_name(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Normal => "normal",
        SortDirection::Reverse => "reverse",
    }
}
