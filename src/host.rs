//! Host introspection
//!
//! Gathers a fresh snapshot of static host facts for each request. The
//! detailed CPU and memory figures come from `/proc`-style pseudo-files;
//! every field degrades independently to a portable fallback when its
//! source is missing or malformed, and a failed read never fails the
//! request.

use std::fs;
use std::path::Path;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

use crate::config::AppConfig;

/// Static facts about the host, computed fresh per call
#[derive(Debug, Clone)]
pub struct HostSnapshot {
    /// Schedulable execution units as reported by the OS
    pub logical_cpus: usize,

    /// Model description plus detected core count
    pub cpu_info: String,

    /// Total memory as "X.XX GB", or "Unknown"
    pub memory: String,

    /// OS name and release
    pub platform: String,
}

impl HostSnapshot {
    pub fn capture(config: &AppConfig) -> Self {
        Self::from_paths(&config.cpuinfo_path, &config.meminfo_path)
    }

    pub fn from_paths(cpuinfo_path: &Path, meminfo_path: &Path) -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::new().with_cpu(CpuRefreshKind::everything()),
        );
        let logical_cpus = sys.cpus().len().max(1);

        let cpu_info = match cpu_details(cpuinfo_path) {
            Some(info) => info,
            None => {
                tracing::debug!(
                    path = %cpuinfo_path.display(),
                    "CPU descriptor source unavailable, using generic processor description"
                );
                format!("{} ({} cores)", processor_brand(&sys), logical_cpus)
            }
        };

        let memory = match total_memory_gb(meminfo_path) {
            Some(memory) => memory,
            None => {
                tracing::debug!(
                    path = %meminfo_path.display(),
                    "memory source unavailable"
                );
                "Unknown".to_string()
            }
        };

        Self {
            logical_cpus,
            cpu_info,
            memory,
            platform: platform_description(),
        }
    }
}

/// Parse a `/proc/cpuinfo`-style file: one `processor` entry per logical
/// CPU, each with a `model name` field. Returns None if the file cannot be
/// read or does not carry both pieces.
fn cpu_details(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let cores = text
        .lines()
        .filter(|line| line.starts_with("processor"))
        .count();
    if cores == 0 {
        return None;
    }
    let model = text
        .lines()
        .find(|line| line.starts_with("model name"))
        .and_then(|line| line.split(':').nth(1))
        .map(str::trim)?;
    Some(format!("{} ({} cores detected)", model, cores))
}

/// Parse a `/proc/meminfo`-style file for the `MemTotal:` figure in kB and
/// render it in gigabytes.
fn total_memory_gb(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let line = text.lines().find(|line| line.starts_with("MemTotal:"))?;
    let kb: f64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(format!("{:.2} GB", kb / 1024.0 / 1024.0))
}

/// Generic processor description used when the detailed source is missing
fn processor_brand(sys: &System) -> String {
    sys.cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
        .or_else(System::cpu_arch)
        .unwrap_or_else(|| std::env::consts::ARCH.to_string())
}

fn platform_description() -> String {
    let name = System::name().unwrap_or_else(|| std::env::consts::OS.to_string());
    let release = System::kernel_version().unwrap_or_else(|| "unknown".to_string());
    format!("{} {}", name, release)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_cpu_details_parses_model_and_cores() {
        let cpuinfo = temp_file(
            "processor\t: 0\n\
             model name\t: Fake CPU @ 2.40GHz\n\
             cache size\t: 512 KB\n\
             \n\
             processor\t: 1\n\
             model name\t: Fake CPU @ 2.40GHz\n",
        );

        let info = cpu_details(cpuinfo.path()).unwrap();
        assert_eq!(info, "Fake CPU @ 2.40GHz (2 cores detected)");
    }

    #[test]
    fn test_cpu_details_rejects_malformed_source() {
        let cpuinfo = temp_file("no recognizable fields here\n");
        assert!(cpu_details(cpuinfo.path()).is_none());
    }

    #[test]
    fn test_cpu_details_missing_file() {
        assert!(cpu_details(Path::new("/nonexistent/cpuinfo")).is_none());
    }

    #[test]
    fn test_total_memory_converts_kb_to_gb() {
        let meminfo = temp_file(
            "MemTotal:        4194304 kB\n\
             MemFree:          123456 kB\n",
        );

        assert_eq!(total_memory_gb(meminfo.path()).unwrap(), "4.00 GB");
    }

    #[test]
    fn test_total_memory_missing_file() {
        assert!(total_memory_gb(Path::new("/nonexistent/meminfo")).is_none());
    }

    #[test]
    fn test_snapshot_falls_back_without_pseudo_files() {
        let snapshot = HostSnapshot::from_paths(
            Path::new("/nonexistent/cpuinfo"),
            Path::new("/nonexistent/meminfo"),
        );

        assert!(snapshot.logical_cpus >= 1);
        assert!(snapshot.cpu_info.ends_with("cores)"));
        assert!(!snapshot.cpu_info.contains("detected"));
        assert_eq!(snapshot.memory, "Unknown");
        assert!(!snapshot.platform.is_empty());
    }

    #[test]
    fn test_snapshot_uses_pseudo_files_when_present() {
        let cpuinfo = temp_file("processor\t: 0\nmodel name\t: Test CPU\n");
        let meminfo = temp_file("MemTotal: 2097152 kB\n");

        let snapshot = HostSnapshot::from_paths(cpuinfo.path(), meminfo.path());
        assert_eq!(snapshot.cpu_info, "Test CPU (1 cores detected)");
        assert_eq!(snapshot.memory, "2.00 GB");
    }
}
