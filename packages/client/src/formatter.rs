//! Terminal output formatting for the round client.

use roundfeed_shared::time::timestamp_to_rfc3339;

use crate::{clock::display, pool::Namespace, ticker::Snapshot};

/// Formatter for client display
pub struct StatusFormatter;

impl StatusFormatter {
    /// Format the status line of a watched namespace
    ///
    /// # Arguments
    ///
    /// * `namespace` - The namespace the view is attached to
    /// * `snapshot` - Latest clock snapshot, `None` before the first round arrives
    ///
    /// # Returns
    ///
    /// A line like `[coin-toss] Betting Open 0:20 (round 1f2e)`
    pub fn format_status(namespace: &Namespace, snapshot: Option<&Snapshot>) -> String {
        match snapshot {
            Some(snapshot) => {
                let shown = display(&snapshot.state, snapshot.round.game_type);
                format!(
                    "[{}] {} {} (round {})",
                    namespace,
                    shown.label,
                    shown.text,
                    short_id(snapshot.round.id.as_str())
                )
            }
            None => format!("[{}] waiting for round...", namespace),
        }
    }

    /// Format the notice printed when a new round starts
    pub fn format_round_started(namespace: &Namespace, snapshot: &Snapshot) -> String {
        format!(
            "\n* [{}] {} round {} started at {}\n",
            namespace,
            snapshot.round.game_type,
            short_id(snapshot.round.id.as_str()),
            timestamp_to_rfc3339(snapshot.round.started_at)
        )
    }

    /// Format a watch confirmation
    ///
    /// # Arguments
    ///
    /// * `namespace` - The namespace now being watched
    /// * `ref_count` - How many views share the namespace's connection
    pub fn format_watching(namespace: &Namespace, ref_count: usize) -> String {
        format!(
            "\n+ watching {} ({} view(s) on this connection)\n",
            namespace, ref_count
        )
    }

    /// Format an unwatch confirmation
    pub fn format_unwatched(namespace: &Namespace, remaining: usize) -> String {
        if remaining == 0 {
            format!("\n- stopped watching {} (connection closed)\n", namespace)
        } else {
            format!(
                "\n- stopped watching {} ({} view(s) still attached)\n",
                namespace, remaining
            )
        }
    }

    /// Format the pool summary
    pub fn format_pool(namespaces: &[(Namespace, usize)]) -> String {
        let mut output = String::new();
        output.push_str("\n============================================================\n");
        output.push_str("Connections:\n");

        if namespaces.is_empty() {
            output.push_str("(No connections)\n");
        } else {
            for (namespace, ref_count) in namespaces {
                output.push_str(&format!("{} - {} holder(s)\n", namespace, ref_count));
            }
        }

        output.push_str("============================================================\n");
        output
    }

    pub fn format_help() -> String {
        "\nCommands:\n  \
         watch <namespace>    attach a view to a namespace\n  \
         unwatch <namespace>  detach the most recent view of a namespace\n  \
         status               show every view's countdown\n  \
         pool                 show live connections\n  \
         help                 show this help\n  \
         quit                 exit\n"
            .to_string()
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
