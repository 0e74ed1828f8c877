//! Stateless renderers for each resource table and the message table.
//!
//! Each renderer clears the table, writes the header, writes the filtered
//! rows in natural order of their first column, and titles the table as
//! `<Name (rows)>`.

use std::collections::{BTreeMap, BTreeSet};

use kafkalens_types::{ConsumedMessage, GroupMeta, TopicMeta};

use crate::data::{matches_filter, message_matches, natural_cmp, truncate_cell};
use crate::view::TableModel;

pub const TOPIC_HEADER: [&str; 4] = ["Topic", "Partitions", "Replication", "Messages"];
pub const CONTEXT_HEADER: [&str; 2] = ["Context", "Current"];
pub const GROUP_HEADER: [&str; 3] = ["Group", "State", "Consumers"];
pub const MESSAGE_HEADER: [&str; 6] = [
    "Offset",
    "Partition",
    "KeySchemaID",
    "ValueSchemaID",
    "Key",
    "Value",
];

/// Paint `rows` under `header`, keeping only rows whose first cell matches
/// `filter`, sorted naturally by that first cell.
fn paint(table: &mut TableModel, name: &str, header: &[&str], mut rows: Vec<Vec<String>>, filter: &str) {
    rows.retain(|row| row.first().is_some_and(|key| matches_filter(key, filter)));
    rows.sort_by(|a, b| natural_cmp(&a[0], &b[0]));

    table.clear();
    table.set_header_row(header);
    for (i, row) in rows.into_iter().enumerate() {
        table.set_data_row(i + 1, row);
    }
    table.set_title(format!("<{} ({})>", name, table.row_count() - 1));
    table.clamp_selection();
}

pub fn render_topics(table: &mut TableModel, topics: &BTreeMap<String, TopicMeta>, filter: &str) {
    let rows = topics
        .iter()
        .map(|(name, meta)| {
            vec![
                name.clone(),
                meta.partitions.to_string(),
                meta.replication_factor.to_string(),
                meta.message_count.to_string(),
            ]
        })
        .collect();
    paint(table, "Topics", &TOPIC_HEADER, rows, filter);
}

pub fn render_contexts(table: &mut TableModel, contexts: &BTreeSet<String>, current: &str, filter: &str) {
    let rows = contexts
        .iter()
        .map(|name| {
            let marker = if name == current { "*" } else { "" };
            vec![name.clone(), marker.to_string()]
        })
        .collect();
    paint(table, "Contexts", &CONTEXT_HEADER, rows, filter);
}

pub fn render_groups(table: &mut TableModel, groups: &BTreeMap<String, GroupMeta>, filter: &str) {
    let rows = groups
        .values()
        .map(|g| vec![g.name.clone(), g.state.clone(), g.consumers.to_string()])
        .collect();
    paint(table, "ConsumerGroups", &GROUP_HEADER, rows, filter);
}

/// Message table content built off the UI thread by the refresh task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRows {
    /// Pipeline session the rows belong to; stale sessions are dropped.
    pub session: u64,
    /// Filtered, truncated rows in cache order.
    pub rows: Vec<Vec<String>>,
    /// Messages in the cache before filtering.
    pub total: usize,
}

fn schema_cell(id: Option<i32>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

/// Display cells of one message.
pub fn message_row(message: &ConsumedMessage) -> Vec<String> {
    vec![
        message.offset.to_string(),
        message.partition.to_string(),
        schema_cell(message.key_schema_id),
        schema_cell(message.value_schema_id),
        truncate_cell(&message.key),
        truncate_cell(&message.value),
    ]
}

/// Build the message rows that pass `filter`.
pub fn message_rows<'a>(
    messages: impl IntoIterator<Item = &'a ConsumedMessage>,
    filter: &str,
) -> Vec<Vec<String>> {
    messages
        .into_iter()
        .filter(|m| message_matches(m, filter))
        .map(message_row)
        .collect()
}

/// Paint a message table and move the selection to the newest row.
pub fn render_messages(table: &mut TableModel, title: String, rows: Vec<Vec<String>>) {
    table.clear();
    table.set_header_row(&MESSAGE_HEADER);
    for row in rows {
        table.push_row(row);
    }
    table.set_title(title);
    table.scroll_to_end();
}
