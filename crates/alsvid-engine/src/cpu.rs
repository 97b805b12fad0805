//! CPU allotment detection.
//!
//! Containers usually cap CPU time through a cgroup quota while still
//! exposing every host core, so the pool size is derived from the quota when
//! one is set.

use std::path::Path;
use std::thread;

use tracing::debug;

/// Default cgroup mount point.
pub const CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// CPUs granted by the cgroup quota under `root`, or `None` when unlimited.
///
/// cgroup v2 (`cpu.max`) is tried first, then cgroup v1
/// (`cpu/cpu.cfs_quota_us` and `cpu/cpu.cfs_period_us`). A quota below one
/// CPU counts as one.
pub fn cgroup_cpu_limit(root: &Path) -> Option<usize> {
    let (quota, period) = read_v2(root).or_else(|| read_v1(root))?;
    if quota <= 0 || period <= 0 {
        return None;
    }
    Some(usize::try_from(quota / period).unwrap_or(usize::MAX).max(1))
}

fn read_v2(root: &Path) -> Option<(i64, i64)> {
    let contents = std::fs::read_to_string(root.join("cpu.max")).ok()?;
    let mut fields = contents.split_whitespace();
    let quota = fields.next()?;
    let period = fields.next().map_or(Some(100_000), |p| p.parse().ok())?;
    if quota == "max" {
        return Some((-1, period));
    }
    Some((quota.parse().ok()?, period))
}

fn read_v1(root: &Path) -> Option<(i64, i64)> {
    let read = |name: &str| -> Option<i64> {
        std::fs::read_to_string(root.join("cpu").join(name))
            .ok()?
            .trim()
            .parse()
            .ok()
    };
    Some((read("cpu.cfs_quota_us")?, read("cpu.cfs_period_us")?))
}

/// CPUs usable by this process: the cgroup quota capped by the core count.
pub fn effective_cpus() -> usize {
    let available = thread::available_parallelism().map_or(1, |n| n.get());
    let quota = cgroup_cpu_limit(Path::new(CGROUP_ROOT));
    debug!(available, ?quota, "Detected CPU allotment");
    quota.map_or(available, |q| q.min(available))
}

/// Worker count for a requested override and the effective CPU count.
///
/// The override is honored only when it lies in `1..=effective`.
pub fn worker_count(requested: Option<usize>, effective: usize) -> usize {
    let effective = effective.max(1);
    match requested {
        Some(n) if (1..=effective).contains(&n) => n,
        _ => effective,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_cgroup_v2() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cpu.max"), "250000 100000\n").unwrap();
        assert_eq!(cgroup_cpu_limit(dir.path()), Some(2));

        fs::write(dir.path().join("cpu.max"), "max 100000\n").unwrap();
        assert_eq!(cgroup_cpu_limit(dir.path()), None);

        fs::write(dir.path().join("cpu.max"), "50000 100000\n").unwrap();
        assert_eq!(cgroup_cpu_limit(dir.path()), Some(1));
    }

    #[test]
    fn test_cgroup_v1() {
        let dir = tempfile::tempdir().unwrap();
        let cpu = dir.path().join("cpu");
        fs::create_dir(&cpu).unwrap();
        fs::write(cpu.join("cpu.cfs_quota_us"), "400000\n").unwrap();
        fs::write(cpu.join("cpu.cfs_period_us"), "100000\n").unwrap();
        assert_eq!(cgroup_cpu_limit(dir.path()), Some(4));

        fs::write(cpu.join("cpu.cfs_quota_us"), "-1\n").unwrap();
        assert_eq!(cgroup_cpu_limit(dir.path()), None);
    }

    #[test]
    fn test_missing_cgroup_files_mean_unlimited() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cgroup_cpu_limit(dir.path()), None);
    }

    #[test]
    fn test_worker_count() {
        assert_eq!(worker_count(None, 8), 8);
        assert_eq!(worker_count(Some(3), 8), 3);
        assert_eq!(worker_count(Some(8), 8), 8);
        assert_eq!(worker_count(Some(16), 8), 8);
        assert_eq!(worker_count(Some(0), 8), 8);
        assert_eq!(worker_count(None, 0), 1);
    }

    #[test]
    fn test_effective_cpus_is_positive() {
        assert!(effective_cpus() >= 1);
    }
}
