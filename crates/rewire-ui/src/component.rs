//! Serializable component descriptions and their dispatch to a render tree.
//!
//! [`Component`] is a closed sum type: one variant per widget the host can
//! show, matched exhaustively in [`Component::render`]. Event handlers are
//! referenced by [`HandlerId`], not closures, so a description stays a plain
//! value (and serializes under the `serde` feature).

use std::fmt;

/// Host-side callback reference carried by interactive variants.
pub type HandlerId = u64;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Neutral,
    Primary,
    Success,
    Warning,
    Danger,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Start,
    End,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<f64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct GanttTask {
    pub label: String,
    pub start: f64,
    pub duration: f64,
    /// 0.0..=1.0
    pub progress: f64,
}

/// One widget description. Adding a variant forces every dispatcher through
/// the compiler, which is the point of keeping this closed.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    // typography
    Text { content: String },
    Heading { level: u8, content: String },
    Code { content: String },
    Badge { text: String, tone: Tone },

    // buttons
    Button { label: String, tone: Tone, on_press: HandlerId },
    IconButton { icon: String, on_press: HandlerId },
    Link { label: String, href: String },

    // layout
    Row { gap: f32, children: Vec<Component> },
    Column { gap: f32, children: Vec<Component> },
    Stack { children: Vec<Component> },
    Grid { columns: usize, children: Vec<Component> },
    Card { title: Option<String>, children: Vec<Component> },
    Spacer { extent: f32 },
    Divider,

    // forms
    TextInput { value: String, placeholder: String, on_change: HandlerId },
    Checkbox { checked: bool, label: String, on_toggle: HandlerId },
    RadioGroup { choices: Vec<Choice>, selected: Option<String>, on_select: HandlerId },
    Switch { on: bool, label: String, on_toggle: HandlerId },
    Slider { value: f64, min: f64, max: f64, on_change: HandlerId },
    Select { choices: Vec<Choice>, selected: Option<String>, on_select: HandlerId },
    Progress { value: f64, max: f64 },

    // collections
    Table { columns: Vec<String>, rows: Vec<Vec<String>> },
    List { items: Vec<Component> },
    Tabs { labels: Vec<String>, active: usize, on_select: HandlerId, panels: Vec<Component> },

    // overlays
    Dialog { title: String, open: bool, on_close: HandlerId, children: Vec<Component> },
    Drawer { side: Side, open: bool, on_close: HandlerId, children: Vec<Component> },
    Tooltip { text: String, child: Box<Component> },

    // charts
    BarChart { series: Vec<Series> },
    LineChart { series: Vec<Series> },
    GanttChart { tasks: Vec<GanttTask> },
}

/// Semantic role of a rendered node. The host maps roles to its own
/// primitives; this core never paints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Text,
    Heading,
    Code,
    Badge,
    Button,
    Link,
    Group,
    Card,
    Separator,
    Spacer,
    Input,
    Toggle,
    Option,
    Slider,
    Progress,
    Table,
    TableRow,
    Cell,
    List,
    TabBar,
    Tab,
    Overlay,
    Tooltip,
    Chart,
    ChartSeries,
    GanttBar,
}

/// Host-paintable render tree produced by [`Component::render`].
#[derive(Clone, PartialEq)]
pub struct Node {
    pub role: Role,
    pub text: Option<String>,
    pub handler: Option<HandlerId>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(role: Role) -> Self {
        Node {
            role,
            text: None,
            handler: None,
            children: vec![],
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn handler(mut self, id: HandlerId) -> Self {
        self.handler = Some(id);
        self
    }

    pub fn with_children(mut self, kids: Vec<Node>) -> Self {
        self.children = kids;
        self
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Node");
        d.field("role", &self.role);
        if let Some(t) = &self.text {
            d.field("text", t);
        }
        if let Some(h) = &self.handler {
            d.field("handler", h);
        }
        if !self.children.is_empty() {
            d.field("children", &self.children);
        }
        d.finish()
    }
}

fn render_all(children: &[Component]) -> Vec<Node> {
    children.iter().map(Component::render).collect()
}

impl Component {
    /// Lower this description to a render tree. Exhaustive on purpose: a new
    /// variant does not compile until it renders.
    pub fn render(&self) -> Node {
        match self {
            Component::Text { content } => Node::new(Role::Text).text(content.clone()),
            Component::Heading { level, content } => {
                Node::new(Role::Heading).text(format!("h{level}:{content}"))
            }
            Component::Code { content } => Node::new(Role::Code).text(content.clone()),
            Component::Badge { text, tone } => {
                Node::new(Role::Badge).text(format!("{text} [{tone:?}]"))
            }

            Component::Button { label, tone: _, on_press } => {
                Node::new(Role::Button).text(label.clone()).handler(*on_press)
            }
            Component::IconButton { icon, on_press } => {
                Node::new(Role::Button).text(icon.clone()).handler(*on_press)
            }
            Component::Link { label, href } => Node::new(Role::Link)
                .text(label.clone())
                .with_children(vec![Node::new(Role::Text).text(href.clone())]),

            Component::Row { gap: _, children } => {
                Node::new(Role::Group).text("row").with_children(render_all(children))
            }
            Component::Column { gap: _, children } => {
                Node::new(Role::Group).text("column").with_children(render_all(children))
            }
            Component::Stack { children } => {
                Node::new(Role::Group).text("stack").with_children(render_all(children))
            }
            Component::Grid { columns, children } => Node::new(Role::Group)
                .text(format!("grid:{columns}"))
                .with_children(render_all(children)),
            Component::Card { title, children } => {
                let mut kids = Vec::with_capacity(children.len() + 1);
                if let Some(title) = title {
                    kids.push(Node::new(Role::Heading).text(title.clone()));
                }
                kids.extend(render_all(children));
                Node::new(Role::Card).with_children(kids)
            }
            Component::Spacer { extent } => Node::new(Role::Spacer).text(format!("{extent}")),
            Component::Divider => Node::new(Role::Separator),

            Component::TextInput { value, placeholder, on_change } => Node::new(Role::Input)
                .text(if value.is_empty() { placeholder.clone() } else { value.clone() })
                .handler(*on_change),
            Component::Checkbox { checked, label, on_toggle } => Node::new(Role::Toggle)
                .text(format!("{} {label}", if *checked { "[x]" } else { "[ ]" }))
                .handler(*on_toggle),
            Component::RadioGroup { choices, selected, on_select } => Node::new(Role::Group)
                .text("radio")
                .handler(*on_select)
                .with_children(
                    choices
                        .iter()
                        .map(|c| {
                            let marker = if selected.as_deref() == Some(c.value.as_str()) {
                                "(*)"
                            } else {
                                "( )"
                            };
                            Node::new(Role::Option).text(format!("{marker} {}", c.label))
                        })
                        .collect(),
                ),
            Component::Switch { on, label, on_toggle } => Node::new(Role::Toggle)
                .text(format!("{} {label}", if *on { "on" } else { "off" }))
                .handler(*on_toggle),
            Component::Slider { value, min, max, on_change } => Node::new(Role::Slider)
                .text(format!("{value} in {min}..{max}"))
                .handler(*on_change),
            Component::Select { choices, selected, on_select } => Node::new(Role::Input)
                .text(
                    selected
                        .as_ref()
                        .and_then(|sel| choices.iter().find(|c| &c.value == sel))
                        .map(|c| c.label.clone())
                        .unwrap_or_default(),
                )
                .handler(*on_select)
                .with_children(
                    choices
                        .iter()
                        .map(|c| Node::new(Role::Option).text(c.label.clone()))
                        .collect(),
                ),
            Component::Progress { value, max } => {
                Node::new(Role::Progress).text(format!("{value}/{max}"))
            }

            Component::Table { columns, rows } => {
                let header = Node::new(Role::TableRow).with_children(
                    columns
                        .iter()
                        .map(|c| Node::new(Role::Cell).text(c.clone()))
                        .collect(),
                );
                let mut kids = vec![header];
                kids.extend(rows.iter().map(|row| {
                    Node::new(Role::TableRow).with_children(
                        row.iter()
                            .map(|cell| Node::new(Role::Cell).text(cell.clone()))
                            .collect(),
                    )
                }));
                Node::new(Role::Table).with_children(kids)
            }
            Component::List { items } => {
                Node::new(Role::List).with_children(render_all(items))
            }
            Component::Tabs { labels, active, on_select, panels } => {
                let bar = Node::new(Role::TabBar).handler(*on_select).with_children(
                    labels
                        .iter()
                        .enumerate()
                        .map(|(i, l)| {
                            let marker = if i == *active { "*" } else { "" };
                            Node::new(Role::Tab).text(format!("{l}{marker}"))
                        })
                        .collect(),
                );
                // only the active panel is lowered
                let mut kids = vec![bar];
                if let Some(panel) = panels.get(*active) {
                    kids.push(panel.render());
                }
                Node::new(Role::Group).text("tabs").with_children(kids)
            }

            Component::Dialog { title, open, on_close, children } => {
                let node = Node::new(Role::Overlay).text(format!("dialog:{title}"));
                if !*open {
                    return node;
                }
                let mut kids = vec![Node::new(Role::Button).text("close").handler(*on_close)];
                kids.extend(render_all(children));
                node.with_children(kids)
            }
            Component::Drawer { side, open, on_close, children } => {
                let node = Node::new(Role::Overlay).text(format!("drawer:{side:?}"));
                if !*open {
                    return node;
                }
                let mut kids = vec![Node::new(Role::Button).text("close").handler(*on_close)];
                kids.extend(render_all(children));
                node.with_children(kids)
            }
            Component::Tooltip { text, child } => Node::new(Role::Tooltip)
                .text(text.clone())
                .with_children(vec![child.render()]),

            Component::BarChart { series } => Node::new(Role::Chart)
                .text("bar")
                .with_children(series.iter().map(series_node).collect()),
            Component::LineChart { series } => Node::new(Role::Chart)
                .text("line")
                .with_children(series.iter().map(series_node).collect()),
            Component::GanttChart { tasks } => Node::new(Role::Chart).text("gantt").with_children(
                tasks
                    .iter()
                    .map(|t| {
                        Node::new(Role::GanttBar).text(format!(
                            "{} @{}+{} {:.0}%",
                            t.label,
                            t.start,
                            t.duration,
                            t.progress * 100.0
                        ))
                    })
                    .collect(),
            ),
        }
    }
}

fn series_node(s: &Series) -> Node {
    Node::new(Role::ChartSeries).text(s.label.clone()).with_children(
        s.points
            .iter()
            .map(|p| Node::new(Role::Cell).text(format!("{p}")))
            .collect(),
    )
}
