//! # Status Command
//!
//! `/status` reports uptime, tick rate, bandwidth, threads, memory, and a
//! line per loaded world. It only reads from a [`ServerStatus`].

use std::time::Duration;

use crate::command::{test_permission, CommandSender};

/// Chat colour codes.
pub mod text_format {
    /// `§a`
    pub const GREEN: &str = "§a";
    /// `§c`
    pub const RED: &str = "§c";
    /// `§e`
    pub const YELLOW: &str = "§e";
    /// `§f`
    pub const WHITE: &str = "§f";
    /// `§6`
    pub const GOLD: &str = "§6";
    /// `§r`
    pub const RESET: &str = "§r";
}

use text_format::{GOLD, GREEN, RED, RESET, WHITE, YELLOW};

/// TPS at or above this is healthy.
const TPS_HEALTHY: f64 = 17.0;
/// TPS below this is critical.
const TPS_CRITICAL: f64 = 12.0;
/// World tick times above this are flagged.
const SLOW_TICK_MS: f64 = 40.0;

const BULLET: &str = "§6» §f";

/// Memory figures in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryUsage {
    /// Memory used by the main thread.
    pub main_thread: u64,
    /// Memory used by the whole process.
    pub total: u64,
    /// Virtual memory reserved by the process.
    pub virtual_memory: u64,
}

/// One loaded world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldStatus {
    /// Directory name.
    pub folder_name: String,
    /// Name shown to players.
    pub display_name: String,
    /// Loaded chunks.
    pub loaded_chunks: usize,
    /// Entities in the world.
    pub entities: usize,
    /// Last tick duration in milliseconds.
    pub tick_time_ms: f64,
}

/// Read-only view of server health.
pub trait ServerStatus {
    /// Time since start.
    fn uptime(&self) -> Duration;
    /// Current ticks per second.
    fn ticks_per_second(&self) -> f64;
    /// Current tick usage in percent.
    fn tick_usage(&self) -> f64;
    /// Average ticks per second.
    fn ticks_per_second_average(&self) -> f64;
    /// Average tick usage in percent.
    fn tick_usage_average(&self) -> f64;
    /// Average upload in bytes per second.
    fn upload_bytes_per_second(&self) -> f64;
    /// Average download in bytes per second.
    fn download_bytes_per_second(&self) -> f64;
    /// Live threads.
    fn thread_count(&self) -> usize;
    /// Current memory figures.
    fn memory_usage(&self) -> MemoryUsage;
    /// Memory manager limit in bytes; 0 when unlimited.
    fn global_memory_limit(&self) -> u64;
    /// Loaded worlds.
    fn worlds(&self) -> Vec<WorldStatus>;
}

/// A fixed set of figures, for hosts that sample once per report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusSnapshot {
    /// Time since start.
    pub uptime: Duration,
    /// Current ticks per second.
    pub tps: f64,
    /// Current tick usage in percent.
    pub tick_usage: f64,
    /// Average ticks per second.
    pub tps_average: f64,
    /// Average tick usage in percent.
    pub tick_usage_average: f64,
    /// Average upload in bytes per second.
    pub upload_bytes_per_second: f64,
    /// Average download in bytes per second.
    pub download_bytes_per_second: f64,
    /// Live threads.
    pub threads: usize,
    /// Memory figures.
    pub memory: MemoryUsage,
    /// Memory manager limit in bytes.
    pub global_memory_limit: u64,
    /// Loaded worlds.
    pub worlds: Vec<WorldStatus>,
}

impl ServerStatus for StatusSnapshot {
    fn uptime(&self) -> Duration {
        self.uptime
    }

    fn ticks_per_second(&self) -> f64 {
        self.tps
    }

    fn tick_usage(&self) -> f64 {
        self.tick_usage
    }

    fn ticks_per_second_average(&self) -> f64 {
        self.tps_average
    }

    fn tick_usage_average(&self) -> f64 {
        self.tick_usage_average
    }

    fn upload_bytes_per_second(&self) -> f64 {
        self.upload_bytes_per_second
    }

    fn download_bytes_per_second(&self) -> f64 {
        self.download_bytes_per_second
    }

    fn thread_count(&self) -> usize {
        self.threads
    }

    fn memory_usage(&self) -> MemoryUsage {
        self.memory
    }

    fn global_memory_limit(&self) -> u64 {
        self.global_memory_limit
    }

    fn worlds(&self) -> Vec<WorldStatus> {
        self.worlds.clone()
    }
}

/// The `/status` command.
#[derive(Clone, Debug)]
pub struct StatusCommand {
    permission: String,
}

impl StatusCommand {
    /// Creates the command gated by `permission`.
    #[must_use]
    pub fn new(permission: impl Into<String>) -> Self {
        Self {
            permission: permission.into(),
        }
    }

    /// Permission node checked before running.
    #[must_use]
    pub fn permission(&self) -> &str {
        &self.permission
    }

    /// Sends the report to `sender`.
    ///
    /// Returns false without output (beyond the denial message) if the
    /// sender lacks the permission.
    pub fn execute(&self, sender: &mut dyn CommandSender, server: &dyn ServerStatus) -> bool {
        if !test_permission(sender, &self.permission) {
            return false;
        }
        for line in render_status(server) {
            sender.send_message(line);
        }
        true
    }
}

/// Builds every line of the report.
#[must_use]
pub fn render_status(server: &dyn ServerStatus) -> Vec<String> {
    let mut lines = vec![format!("{YELLOW}[{GOLD}!{YELLOW}] {RESET}{GREEN}Server status:")];

    lines.push(format!(
        "{BULLET}Uptime: {YELLOW}{}",
        format_uptime(server.uptime())
    ));

    let tps = server.ticks_per_second();
    let tps_color = tps_color(tps);
    lines.push(format!(
        "{BULLET}Current TPS: {tps_color}{} ({}%)",
        round2(tps),
        round2(server.tick_usage())
    ));
    lines.push(format!(
        "{BULLET}Average TPS: {tps_color}{} ({}%)",
        round2(server.ticks_per_second_average()),
        round2(server.tick_usage_average())
    ));

    lines.push(format!(
        "{BULLET}Upload: {YELLOW}{:.2} kB/s",
        server.upload_bytes_per_second() / 1024.0
    ));
    lines.push(format!(
        "{BULLET}Download: {YELLOW}{:.2} kB/s",
        server.download_bytes_per_second() / 1024.0
    ));
    lines.push(format!("{BULLET}Threads: {YELLOW}{}", server.thread_count()));

    let memory = server.memory_usage();
    lines.push(format!(
        "{BULLET}Main thread memory: {YELLOW}{} MB.",
        format_megabytes(memory.main_thread)
    ));
    lines.push(format!(
        "{BULLET}Total memory: {YELLOW}{} MB.",
        format_megabytes(memory.total)
    ));
    lines.push(format!(
        "{BULLET}Total virtual memory: {YELLOW}{} MB.",
        format_megabytes(memory.virtual_memory)
    ));

    let limit = server.global_memory_limit();
    if limit > 0 {
        lines.push(format!(
            "{GOLD}Maximum memory (manager): {RED}{} MB.",
            format_megabytes(limit)
        ));
    }

    for world in server.worlds() {
        lines.push(render_world(&world));
    }
    lines
}

fn render_world(world: &WorldStatus) -> String {
    let display = if world.display_name == world.folder_name {
        String::new()
    } else {
        format!(" ({})", world.display_name)
    };
    let time_color = if world.tick_time_ms > SLOW_TICK_MS {
        RED
    } else {
        YELLOW
    };
    format!(
        "{GOLD}World \"{}\"{display}: {RED}{}{GREEN} chunk{}, {RED}{}{GREEN} entit{}. {WHITE}Tick time {time_color}{}ms",
        world.folder_name,
        group_thousands(world.loaded_chunks as u64),
        if world.loaded_chunks == 1 { "" } else { "s" },
        group_thousands(world.entities as u64),
        if world.entities == 1 { "y" } else { "ies" },
        round2(world.tick_time_ms),
    )
}

/// Colour for a TPS figure.
#[must_use]
pub fn tps_color(tps: f64) -> &'static str {
    if tps < TPS_CRITICAL {
        RED
    } else if tps < TPS_HEALTHY {
        GOLD
    } else {
        GREEN
    }
}

/// Formats an uptime as `"1 day 2 hours 3 minutes 4 seconds"`.
///
/// Larger units appear only once reached; seconds always appear.
#[must_use]
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let mut parts = Vec::with_capacity(4);

    if total >= 86_400 {
        parts.push(plural(total / 86_400, "day"));
    }
    if total >= 3_600 {
        parts.push(plural(total % 86_400 / 3_600, "hour"));
    }
    if total >= 60 {
        parts.push(plural(total % 3_600 / 60, "minute"));
    }
    parts.push(plural(total % 60, "second"));
    parts.join(" ")
}

fn plural(value: u64, unit: &str) -> String {
    if value == 1 {
        format!("{value} {unit}")
    } else {
        format!("{value} {unit}s")
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bytes as megabytes with two decimals and thousands separators.
#[must_use]
pub fn format_megabytes(bytes: u64) -> String {
    let hundredths = (bytes as f64 / 1024.0 / 1024.0 * 100.0).round() as u64;
    format!("{}.{:02}", group_thousands(hundredths / 100), hundredths % 100)
}

/// `1234567` as `"1,234,567"`.
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_units() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0 seconds");
        assert_eq!(format_uptime(Duration::from_secs(1)), "1 second");
        assert_eq!(format_uptime(Duration::from_secs(61)), "1 minute 1 second");
        assert_eq!(
            format_uptime(Duration::from_secs(3_600)),
            "1 hour 0 minutes 0 seconds"
        );
        assert_eq!(
            format_uptime(Duration::from_secs(2 * 86_400 + 3 * 3_600 + 4 * 60 + 5)),
            "2 days 3 hours 4 minutes 5 seconds"
        );
    }

    #[test]
    fn test_tps_colors() {
        assert_eq!(tps_color(20.0), GREEN);
        assert_eq!(tps_color(17.0), GREEN);
        assert_eq!(tps_color(16.9), GOLD);
        assert_eq!(tps_color(12.0), GOLD);
        assert_eq!(tps_color(11.99), RED);
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(format_megabytes(1024 * 1024 * 1536), "1,536.00");
        assert_eq!(format_megabytes(1024 * 1024 / 2), "0.50");
    }

    #[test]
    fn test_world_line() {
        let world = WorldStatus {
            folder_name: "world".into(),
            display_name: "Overworld".into(),
            loaded_chunks: 1,
            entities: 2_500,
            tick_time_ms: 41.256,
        };
        assert_eq!(
            render_world(&world),
            "§6World \"world\" (Overworld): §c1§a chunk, §c2,500§a entities. §fTick time §c41.26ms"
        );

        let same = WorldStatus {
            folder_name: "nether".into(),
            display_name: "nether".into(),
            loaded_chunks: 12,
            entities: 1,
            tick_time_ms: 3.0,
        };
        assert_eq!(
            render_world(&same),
            "§6World \"nether\": §c12§a chunks, §c1§a entity. §fTick time §e3ms"
        );
    }
}
