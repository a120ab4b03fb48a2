//! Derived views rebuilt from parsed debugger output.
//!
//! Each view is replaced wholesale whenever a record carrying its data
//! arrives. Missing fields read as empty strings.

use midbg_mi::MiValue;
use strum::{AsRefStr, Display};

/// Location where the program last stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionFrame {
    /// Program counter.
    pub address: String,
    /// Function name.
    pub function: String,
    /// Source file as recorded in the debug info.
    pub file: String,
    /// Absolute path of the source file, when the debugger resolved it.
    pub full_path: String,
    /// 1-based source line.
    pub line: String,
    /// Thread that stopped.
    pub thread_id: String,
}

impl ExecutionFrame {
    /// Builds the frame from a stop notification's `frame` tuple.
    #[must_use]
    pub fn from_stop(frame: &MiValue, thread_id: &str) -> Self {
        Self {
            address: frame.field("addr").to_owned(),
            function: frame.field("func").to_owned(),
            file: frame.field("file").to_owned(),
            full_path: frame.field("fullname").to_owned(),
            line: frame.field("line").to_owned(),
            thread_id: thread_id.to_owned(),
        }
    }

    /// Line as a number, when it is a positive integer.
    #[must_use]
    pub fn line_number(&self) -> Option<u32> {
        self.line.parse().ok().filter(|line| *line > 0)
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.address.clone(),
            self.function.clone(),
            self.file.clone(),
            self.line.clone(),
            self.thread_id.clone(),
        ]
    }
}

/// One row of the locals table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalVariable {
    /// Variable name.
    pub name: String,
    /// Declared type.
    pub type_name: String,
    /// Formatted value.
    pub value: String,
}

impl LocalVariable {
    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.type_name.clone(), self.value.clone()]
    }
}

/// One row of the call stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackFrame {
    /// Frame depth; `0` is the innermost frame.
    pub level: String,
    /// Program counter.
    pub address: String,
    /// Function name.
    pub function: String,
    /// Source file.
    pub file: String,
    /// Source line.
    pub line: String,
}

impl StackFrame {
    fn row(&self) -> Vec<String> {
        vec![
            self.level.clone(),
            self.address.clone(),
            self.function.clone(),
            self.file.clone(),
            self.line.clone(),
        ]
    }
}

/// Builds the locals table from a `locals=[...]` list.
#[must_use]
pub fn locals_from(list: &MiValue) -> Vec<LocalVariable> {
    list.entries()
        .iter()
        .map(|entry| {
            let local = entry.value();
            LocalVariable {
                name: local.field("name").to_owned(),
                type_name: local.field("type").to_owned(),
                value: local.field("value").to_owned(),
            }
        })
        .collect()
}

/// Builds the call stack from a `stack=[frame={...},...]` list.
///
/// Elements not named `frame` are skipped.
#[must_use]
pub fn frames_from(list: &MiValue) -> Vec<StackFrame> {
    list.entries()
        .iter()
        .filter(|entry| entry.name() == Some("frame"))
        .map(|entry| {
            let frame = entry.value();
            StackFrame {
                level: frame.field("level").to_owned(),
                address: frame.field("addr").to_owned(),
                function: frame.field("func").to_owned(),
                file: frame.field("file").to_owned(),
                line: frame.field("line").to_owned(),
            }
        })
        .collect()
}

/// The three views kept by a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugViews {
    /// Where the program last stopped.
    pub execution: Option<ExecutionFrame>,
    /// Locals of the current frame.
    pub locals: Vec<LocalVariable>,
    /// Current call stack.
    pub frames: Vec<StackFrame>,
}

impl DebugViews {
    /// Renders one view as a header row plus string rows.
    #[must_use]
    pub fn table(&self, kind: ModelKind) -> ViewTable {
        let rows = match kind {
            ModelKind::Execution => self.execution.iter().map(ExecutionFrame::row).collect(),
            ModelKind::Locals => self.locals.iter().map(LocalVariable::row).collect(),
            ModelKind::CallStack => self.frames.iter().map(StackFrame::row).collect(),
        };
        ViewTable { kind, rows }
    }
}

/// Selects one of the derived views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ModelKind {
    /// Current stop location.
    Execution,
    /// Local variables.
    Locals,
    /// Call stack.
    CallStack,
}

impl ModelKind {
    /// Column headers for the view.
    #[must_use]
    pub const fn headers(self) -> &'static [&'static str] {
        match self {
            Self::Execution => &["Address", "Function", "File", "Line", "Thread ID"],
            Self::Locals => &["Name", "Type", "Value"],
            Self::CallStack => &["Level", "Address", "Function", "File", "Line"],
        }
    }
}

/// A view flattened to text, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTable {
    /// Which view the rows came from.
    pub kind: ModelKind,
    /// One entry per row, with as many cells as [`ViewTable::headers`].
    pub rows: Vec<Vec<String>>,
}

impl ViewTable {
    /// Column headers.
    #[must_use]
    pub const fn headers(&self) -> &'static [&'static str] {
        self.kind.headers()
    }
}
