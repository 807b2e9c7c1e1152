//! Workflow Diagram - static renderings of the router graph

use crate::services::router::Stage;

/// Terminal node name
pub const END: &str = "END";

/// Kind of edge between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Taken when the routing rule selects it
    Conditional,
    /// Always taken
    Direct,
}

/// One edge of the workflow graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: &'static str,
    pub to: &'static str,
    pub kind: EdgeKind,
    pub label: Option<&'static str>,
}

const fn edge(
    from: &'static str,
    to: &'static str,
    kind: EdgeKind,
    label: Option<&'static str>,
) -> Edge {
    Edge {
        from,
        to,
        kind,
        label,
    }
}

/// Nodes in declaration order; the first is the entry point
pub const NODES: [&str; 5] = [
    "check_time",
    "generate_message",
    "send_sms",
    "schedule_meeting",
    END,
];

/// Every transition the router can take
pub const EDGES: [Edge; 7] = [
    edge("check_time", "generate_message", EdgeKind::Conditional, Some("after hours")),
    edge("check_time", END, EdgeKind::Conditional, Some("within hours")),
    edge("generate_message", "send_sms", EdgeKind::Conditional, Some("composed")),
    edge("generate_message", END, EdgeKind::Conditional, Some("compose failed")),
    edge("send_sms", "schedule_meeting", EdgeKind::Conditional, Some("accepted")),
    edge("send_sms", END, EdgeKind::Conditional, Some("delivery failed")),
    edge("schedule_meeting", END, EdgeKind::Direct, None),
];

/// Node path of the two successful executions
pub fn execution_paths() -> [Vec<&'static str>; 2] {
    let within_hours = vec![Stage::CheckTime.node_name(), END];
    let after_hours = [
        Stage::CheckTime,
        Stage::ComposeMessage,
        Stage::SendNotification,
        Stage::MarkFollowUp,
    ]
    .iter()
    .map(Stage::node_name)
    .chain(std::iter::once(END))
    .collect();
    [within_hours, after_hours]
}

/// Render the graph as Mermaid flowchart source
pub fn render_mermaid() -> String {
    let mut out = String::from("graph TD\n");
    out.push_str(&format!("    __start__([start]) --> {}\n", NODES[0]));
    for e in EDGES.iter() {
        let to = if e.to == END { "__end__([end])" } else { e.to };
        let arrow = match e.kind {
            EdgeKind::Conditional => "-.->",
            EdgeKind::Direct => "-->",
        };
        match e.label {
            Some(label) => out.push_str(&format!("    {} {}|{}| {}\n", e.from, arrow, label, to)),
            None => out.push_str(&format!("    {} {} {}\n", e.from, arrow, to)),
        }
    }
    out
}

/// Render the graph as a box diagram
pub fn render_ascii() -> String {
    const BOX: &str = r#"
    +------------------+
    |    check_time    | <--- entry point
    +------------------+
             |
        after hours?
        /          \
      yes           no
       |             |
       v             v
  +------------+  +---------+
  | generate   |  |   END   |
  | message    |  | (no     |
  +------------+  | action) |
       |          +---------+
       v
  +------------+
  |  send_sms  |
  +------------+
       |
       v
  +------------+
  | schedule   |
  | meeting    |
  +------------+
       |
       v
  +------------+
  |    END     |
  | (handled)  |
  +------------+
"#;
    let mut out = String::from(BOX);
    out.push('\n');
    for (i, path) in execution_paths().iter().enumerate() {
        out.push_str(&format!("Path {}: {}\n", i + 1, path.join(" -> ")));
    }
    out
}
