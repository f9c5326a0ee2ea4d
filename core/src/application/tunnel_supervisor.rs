//! SSH tunnel supervision.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};

use crate::adapters::{JsonTunnelStore, SystemSpawner};
use crate::domain::{Signal, TunnelDefinition, TunnelStatus};
use crate::error::Result;
use crate::ports::{ProcessSpawner, SupervisedProcess, TunnelRepository};

use super::escalation::{escalate, Escalate, EscalationOutcome, EscalationPolicy};

/// Owns the tunnel definitions and the ssh subprocesses started for them.
///
/// Every definition change is written through to the repository before the
/// call returns. Subprocess handles live only in memory and belong to this
/// instance; a second supervisor over the same store sees no running tunnels.
///
/// `status` takes `&mut self` because it reaps handles whose process exited:
/// such a tunnel reports [`TunnelStatus::Error`] once and
/// [`TunnelStatus::Stopped`] afterwards.
pub struct TunnelSupervisor<R: TunnelRepository = JsonTunnelStore, S: ProcessSpawner = SystemSpawner>
{
    repo: R,
    spawner: S,
    ssh_program: String,
    policy: EscalationPolicy,
    tunnels: BTreeMap<String, TunnelDefinition>,
    handles: HashMap<String, S::Child>,
}

impl<R: TunnelRepository, S: ProcessSpawner> TunnelSupervisor<R, S> {
    /// Load the definition set from `repo`.
    ///
    /// A store that can't be read or parsed starts out empty.
    pub fn new(repo: R, spawner: S) -> Self {
        let tunnels = repo.load().unwrap_or_else(|e| {
            warn!(error = %e, "Could not load tunnel definitions, starting empty");
            BTreeMap::new()
        });

        debug!(count = tunnels.len(), "Loaded tunnel definitions");

        Self {
            repo,
            spawner,
            ssh_program: "ssh".to_string(),
            policy: EscalationPolicy::tunnel_defaults(),
            tunnels,
            handles: HashMap::new(),
        }
    }

    /// Use `program` instead of `ssh`.
    pub fn with_ssh_program(mut self, program: impl Into<String>) -> Self {
        self.ssh_program = program.into();
        self
    }

    /// Override the 5s/2s stop budget.
    pub fn with_policy(mut self, policy: EscalationPolicy) -> Self {
        self.policy = policy;
        self
    }

    // =========================================================================
    // Definitions
    // =========================================================================

    /// Add a new definition.
    ///
    /// Returns `Ok(false)` without changes if the name is taken.
    pub fn add(&mut self, def: TunnelDefinition) -> Result<bool> {
        if self.tunnels.contains_key(&def.name) {
            return Ok(false);
        }
        def.validate()?;

        let name = def.name.clone();
        self.tunnels.insert(name.clone(), def);

        if let Err(e) = self.persist() {
            self.tunnels.remove(&name);
            return Err(e);
        }

        info!(tunnel = %name, "Added tunnel");
        Ok(true)
    }

    /// Stop (if running) and delete a definition.
    ///
    /// Returns `Ok(false)` if the name is unknown.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        if !self.tunnels.contains_key(name) {
            return Ok(false);
        }

        self.stop(name)?;

        let Some(old) = self.tunnels.remove(name) else {
            return Ok(false);
        };

        if let Err(e) = self.persist() {
            self.tunnels.insert(name.to_string(), old);
            return Err(e);
        }

        info!(tunnel = %name, "Removed tunnel");
        Ok(true)
    }

    /// Replace the definition stored under `name`.
    ///
    /// A running tunnel is stopped first and restarted afterwards only if the
    /// new definition is enabled. The name itself can't change.
    pub fn update(&mut self, name: &str, mut def: TunnelDefinition) -> Result<bool> {
        if !self.tunnels.contains_key(name) {
            return Ok(false);
        }

        def.name = name.to_string();
        def.validate()?;

        let was_running = self.status(name) == TunnelStatus::Running;
        if was_running {
            self.stop(name)?;
        }

        let restart = was_running && def.enabled;
        let previous = self.tunnels.insert(name.to_string(), def);

        if let Err(e) = self.persist() {
            if let Some(previous) = previous {
                self.tunnels.insert(name.to_string(), previous);
            }
            return Err(e);
        }

        debug!(tunnel = %name, restart = restart, "Updated tunnel");

        if restart {
            self.start(name)?;
        }

        Ok(true)
    }

    /// All definitions, ordered by name.
    pub fn get_all(&self) -> Vec<TunnelDefinition> {
        self.tunnels.values().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&TunnelDefinition> {
        self.tunnels.get(name)
    }

    fn persist(&self) -> Result<()> {
        self.repo.save(&self.tunnels).map_err(|e| {
            warn!(error = %e, "Failed to persist tunnel definitions");
            e
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Spawn the ssh process for `name`.
    ///
    /// Unknown names and spawn failures yield [`TunnelStatus::Error`]. A
    /// tunnel that is already running is left alone.
    pub fn start(&mut self, name: &str) -> Result<TunnelStatus> {
        let Some(def) = self.tunnels.get(name) else {
            warn!(tunnel = %name, "Cannot start unknown tunnel");
            return Ok(TunnelStatus::Error);
        };

        // Don't spawn a second process for the same forward
        if let Some(child) = self.handles.get_mut(name) {
            match child.has_exited() {
                Ok(false) => return Ok(TunnelStatus::Running),
                _ => {
                    self.handles.remove(name);
                }
            }
        }

        let argv = def.ssh_command(&self.ssh_program);
        debug!(tunnel = %name, command = %argv.join(" "), "Starting tunnel");

        let child = match self.spawner.spawn(&argv) {
            Ok(child) => child,
            Err(e) => {
                warn!(tunnel = %name, error = %e, "Failed to start tunnel");
                return Ok(TunnelStatus::Error);
            }
        };

        info!(tunnel = %name, pid = child.id(), "Tunnel started");
        self.handles.insert(name.to_string(), child);

        if let Some(def) = self.tunnels.get_mut(name) {
            def.enabled = true;
        }
        self.persist()?;

        Ok(TunnelStatus::Running)
    }

    /// Stop the ssh process for `name` and mark the tunnel disabled.
    ///
    /// Without a tracked process this does nothing and reports stopped.
    pub fn stop(&mut self, name: &str) -> Result<TunnelStatus> {
        let Some(mut child) = self.handles.remove(name) else {
            return Ok(TunnelStatus::Stopped);
        };

        let pid = child.id();
        match escalate(&mut ChildTarget(&mut child), &self.policy) {
            Ok(EscalationOutcome::Graceful) => debug!(tunnel = %name, pid = pid, "Tunnel exited"),
            Ok(EscalationOutcome::Forced) => {
                info!(tunnel = %name, pid = pid, "Tunnel ignored SIGTERM, killed")
            }
            Ok(EscalationOutcome::Survived) => {
                warn!(tunnel = %name, pid = pid, "Tunnel process did not exit, abandoning handle")
            }
            Err(e) => {
                warn!(tunnel = %name, pid = pid, error = %e, "SIGTERM failed, killing tunnel");
                if let Err(e) = child.kill() {
                    warn!(tunnel = %name, pid = pid, error = %e, "Failed to kill tunnel process");
                }
                if !matches!(child.wait_timeout(self.policy.hard_timeout), Ok(true)) {
                    warn!(tunnel = %name, pid = pid, "Tunnel process did not exit, abandoning handle");
                }
            }
        }
        drop(child);

        if let Some(def) = self.tunnels.get_mut(name) {
            def.enabled = false;
        }
        self.persist()?;

        info!(tunnel = %name, "Tunnel stopped");
        Ok(TunnelStatus::Stopped)
    }

    /// Poll the ssh process for `name` without blocking.
    ///
    /// A process that has exited is reaped and reported as
    /// [`TunnelStatus::Error`] for this call only.
    pub fn status(&mut self, name: &str) -> TunnelStatus {
        let Some(child) = self.handles.get_mut(name) else {
            return TunnelStatus::Stopped;
        };

        match child.has_exited() {
            Ok(false) => TunnelStatus::Running,
            Ok(true) => {
                warn!(tunnel = %name, "Tunnel process exited unexpectedly");
                self.handles.remove(name);
                TunnelStatus::Error
            }
            Err(e) => {
                warn!(tunnel = %name, error = %e, "Could not poll tunnel process");
                self.handles.remove(name);
                TunnelStatus::Error
            }
        }
    }

    /// Stop every tracked tunnel, continuing past failures.
    pub fn stop_all(&mut self) {
        let mut names: Vec<String> = self.handles.keys().cloned().collect();
        names.sort();

        for name in names {
            if let Err(e) = self.stop(&name) {
                warn!(tunnel = %name, error = %e, "Failed to stop tunnel");
            }
        }
    }

    /// Start every definition whose enabled flag is set.
    pub fn start_enabled(&mut self) -> Vec<(String, TunnelStatus)> {
        let names: Vec<String> = self
            .tunnels
            .values()
            .filter(|d| d.enabled)
            .map(|d| d.name.clone())
            .collect();

        names
            .into_iter()
            .map(|name| {
                let status = self.start(&name).unwrap_or_else(|e| {
                    warn!(tunnel = %name, error = %e, "Failed to start tunnel");
                    TunnelStatus::Error
                });
                (name, status)
            })
            .collect()
    }

    /// Names with a tracked subprocess, whether or not it is still alive.
    pub fn tracked(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handles.keys().cloned().collect();
        names.sort();
        names
    }
}

struct ChildTarget<'a, C: ?Sized>(&'a mut C);

impl<C: SupervisedProcess + ?Sized> Escalate for ChildTarget<'_, C> {
    fn send(&mut self, signal: Signal) -> Result<()> {
        match signal {
            Signal::Graceful => self.0.terminate(),
            Signal::Hard => self.0.kill(),
        }
    }

    fn has_exited(&mut self) -> Result<bool> {
        self.0.has_exited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    use crate::error::Error;

    #[derive(Default)]
    struct ChildState {
        exited: bool,
        ignores_term: bool,
        term_fails: bool,
        signals: Vec<Signal>,
    }

    struct MockChild {
        pid: u32,
        state: Arc<Mutex<ChildState>>,
    }

    impl SupervisedProcess for MockChild {
        fn id(&self) -> u32 {
            self.pid
        }

        fn terminate(&mut self) -> Result<()> {
            let mut state = self.state.lock();
            state.signals.push(Signal::Graceful);
            if state.term_fails {
                return Err(Error::Io(std::io::Error::from_raw_os_error(22)));
            }
            if !state.ignores_term {
                state.exited = true;
            }
            Ok(())
        }

        fn kill(&mut self) -> Result<()> {
            let mut state = self.state.lock();
            state.signals.push(Signal::Hard);
            state.exited = true;
            Ok(())
        }

        fn has_exited(&mut self) -> Result<bool> {
            Ok(self.state.lock().exited)
        }
    }

    #[derive(Default)]
    struct MockSpawner {
        spawned: Mutex<Vec<(Vec<String>, Arc<Mutex<ChildState>>)>>,
        fail: AtomicBool,
        ignores_term: AtomicBool,
        term_fails: AtomicBool,
    }

    impl MockSpawner {
        fn count(&self) -> usize {
            self.spawned.lock().len()
        }

        fn last_argv(&self) -> Vec<String> {
            self.spawned.lock().last().map(|(a, _)| a.clone()).unwrap_or_default()
        }

        fn last_child(&self) -> Arc<Mutex<ChildState>> {
            self.spawned.lock().last().map(|(_, c)| c.clone()).unwrap()
        }
    }

    impl ProcessSpawner for MockSpawner {
        type Child = MockChild;

        fn spawn(&self, argv: &[String]) -> Result<MockChild> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Spawn("No such file or directory".to_string()));
            }
            let state = Arc::new(Mutex::new(ChildState {
                ignores_term: self.ignores_term.load(Ordering::SeqCst),
                term_fails: self.term_fails.load(Ordering::SeqCst),
                ..Default::default()
            }));
            let mut spawned = self.spawned.lock();
            spawned.push((argv.to_vec(), state.clone()));
            Ok(MockChild {
                pid: 40_000 + spawned.len() as u32,
                state,
            })
        }
    }

    /// In-memory repository that can be told to fail writes.
    #[derive(Default)]
    struct MemoryRepo {
        data: Mutex<BTreeMap<String, TunnelDefinition>>,
        fail_save: AtomicBool,
    }

    impl TunnelRepository for MemoryRepo {
        fn load(&self) -> Result<BTreeMap<String, TunnelDefinition>> {
            Ok(self.data.lock().clone())
        }

        fn save(&self, tunnels: &BTreeMap<String, TunnelDefinition>) -> Result<()> {
            if self.fail_save.load(Ordering::SeqCst) {
                return Err(Error::Storage("disk full".to_string()));
            }
            *self.data.lock() = tunnels.clone();
            Ok(())
        }
    }

    fn supervisor() -> TunnelSupervisor<MemoryRepo, MockSpawner> {
        TunnelSupervisor::new(MemoryRepo::default(), MockSpawner::default()).with_policy(
            EscalationPolicy::new(Duration::from_millis(200), Duration::from_millis(100)),
        )
    }

    fn tunnel(name: &str) -> TunnelDefinition {
        TunnelDefinition::new(name, "testuser", "example.com", 8080, 80)
    }

    fn stored(sup: &TunnelSupervisor<MemoryRepo, MockSpawner>, name: &str) -> TunnelDefinition {
        sup.repo.data.lock().get(name).cloned().unwrap()
    }

    #[test]
    fn test_add_persists() {
        let mut sup = supervisor();
        assert!(sup.add(tunnel("web")).unwrap());
        assert_eq!(stored(&sup, "web"), tunnel("web"));
        assert_eq!(sup.get("web"), Some(&tunnel("web")));
    }

    #[test]
    fn test_add_duplicate_is_rejected() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();

        let mut other = tunnel("web");
        other.remote_host = "other.example.com".to_string();
        assert!(!sup.add(other).unwrap());

        assert_eq!(sup.get_all(), vec![tunnel("web")]);
        assert_eq!(stored(&sup, "web").remote_host, "example.com");
    }

    #[test]
    fn test_add_invalid_is_error() {
        let mut sup = supervisor();
        let mut bad = tunnel("web");
        bad.remote_user = "-oProxyCommand=x".to_string();
        assert!(matches!(sup.add(bad), Err(Error::InvalidTunnel(_))));
        assert!(sup.get_all().is_empty());
    }

    #[test]
    fn test_add_rolls_back_when_store_fails() {
        let mut sup = supervisor();
        sup.repo.fail_save.store(true, Ordering::SeqCst);

        assert!(matches!(sup.add(tunnel("web")), Err(Error::Storage(_))));
        assert!(sup.get("web").is_none());
    }

    #[test]
    fn test_unreadable_store_starts_empty() {
        struct Broken;
        impl TunnelRepository for Broken {
            fn load(&self) -> Result<BTreeMap<String, TunnelDefinition>> {
                Err(Error::Storage("bad json".to_string()))
            }
            fn save(&self, _: &BTreeMap<String, TunnelDefinition>) -> Result<()> {
                Ok(())
            }
        }

        let sup = TunnelSupervisor::new(Broken, MockSpawner::default());
        assert!(sup.get_all().is_empty());
    }

    #[test]
    fn test_get_all_ordered_by_name() {
        let mut sup = supervisor();
        for name in ["zeta", "alpha", "mid"] {
            sup.add(tunnel(name)).unwrap();
        }
        let names: Vec<String> = sup.get_all().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_start_spawns_ssh_and_enables() {
        let mut sup = supervisor();
        sup.add(tunnel("web").with_key("/keys/id")).unwrap();

        assert_eq!(sup.start("web").unwrap(), TunnelStatus::Running);
        assert_eq!(
            sup.spawner.last_argv(),
            vec!["ssh", "-N", "-L", "8080:localhost:80", "-i", "/keys/id", "testuser@example.com"]
        );
        assert!(stored(&sup, "web").enabled);
        assert_eq!(sup.status("web"), TunnelStatus::Running);
    }

    #[test]
    fn test_start_unknown_is_error() {
        let mut sup = supervisor();
        assert_eq!(sup.start("nope").unwrap(), TunnelStatus::Error);
        assert_eq!(sup.spawner.count(), 0);
    }

    #[test]
    fn test_start_twice_spawns_once() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();
        sup.start("web").unwrap();
        assert_eq!(sup.start("web").unwrap(), TunnelStatus::Running);
        assert_eq!(sup.spawner.count(), 1);
    }

    #[test]
    fn test_spawn_failure_leaves_no_handle() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();
        sup.spawner.fail.store(true, Ordering::SeqCst);

        assert_eq!(sup.start("web").unwrap(), TunnelStatus::Error);
        assert_eq!(sup.status("web"), TunnelStatus::Stopped);
        assert!(sup.tracked().is_empty());
        assert!(!stored(&sup, "web").enabled);
    }

    #[test]
    fn test_custom_ssh_program() {
        let mut sup = supervisor().with_ssh_program("/opt/bin/ssh");
        sup.add(tunnel("web")).unwrap();
        sup.start("web").unwrap();
        assert_eq!(sup.spawner.last_argv()[0], "/opt/bin/ssh");
    }

    #[test]
    fn test_stop_graceful() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();
        sup.start("web").unwrap();
        let child = sup.spawner.last_child();

        assert_eq!(sup.stop("web").unwrap(), TunnelStatus::Stopped);
        assert_eq!(child.lock().signals, vec![Signal::Graceful]);
        assert!(!stored(&sup, "web").enabled);
        assert_eq!(sup.status("web"), TunnelStatus::Stopped);
    }

    #[test]
    fn test_stop_escalates() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();
        sup.spawner.ignores_term.store(true, Ordering::SeqCst);
        sup.start("web").unwrap();
        let child = sup.spawner.last_child();

        assert_eq!(sup.stop("web").unwrap(), TunnelStatus::Stopped);
        assert_eq!(child.lock().signals, vec![Signal::Graceful, Signal::Hard]);
        assert!(sup.tracked().is_empty());
    }

    #[test]
    fn test_stop_kills_when_terminate_fails() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();
        sup.spawner.term_fails.store(true, Ordering::SeqCst);
        sup.start("web").unwrap();
        let child = sup.spawner.last_child();

        assert_eq!(sup.stop("web").unwrap(), TunnelStatus::Stopped);
        assert_eq!(child.lock().signals, vec![Signal::Graceful, Signal::Hard]);
        assert!(child.lock().exited);
        assert!(sup.tracked().is_empty());
    }

    #[test]
    fn test_stop_without_handle_is_noop() {
        let mut sup = supervisor();
        assert_eq!(sup.stop("nope").unwrap(), TunnelStatus::Stopped);

        // A persisted enabled flag is left untouched when nothing runs
        let mut def = tunnel("web");
        def.enabled = true;
        sup.add(def).unwrap();
        assert_eq!(sup.stop("web").unwrap(), TunnelStatus::Stopped);
        assert!(stored(&sup, "web").enabled);
    }

    #[test]
    fn test_unexpected_exit_reports_error_once() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();
        sup.start("web").unwrap();
        assert_eq!(sup.status("web"), TunnelStatus::Running);

        sup.spawner.last_child().lock().exited = true;

        assert_eq!(sup.status("web"), TunnelStatus::Error);
        assert_eq!(sup.status("web"), TunnelStatus::Stopped);
        assert_eq!(sup.status("web"), TunnelStatus::Stopped);
    }

    #[test]
    fn test_restart_after_exit_spawns_again() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();
        sup.start("web").unwrap();
        sup.spawner.last_child().lock().exited = true;

        assert_eq!(sup.start("web").unwrap(), TunnelStatus::Running);
        assert_eq!(sup.spawner.count(), 2);
    }

    #[test]
    fn test_remove_stops_running_tunnel() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();
        sup.start("web").unwrap();
        let child = sup.spawner.last_child();

        assert!(sup.remove("web").unwrap());
        assert!(child.lock().exited);
        assert!(sup.get("web").is_none());
        assert!(sup.repo.data.lock().is_empty());
        assert!(!sup.remove("web").unwrap());
    }

    #[test]
    fn test_update_unknown_is_false() {
        let mut sup = supervisor();
        assert!(!sup.update("nope", tunnel("nope")).unwrap());
    }

    #[test]
    fn test_update_running_enabled_restarts() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();
        sup.start("web").unwrap();
        let first = sup.spawner.last_child();

        let mut new_def = tunnel("web");
        new_def.local_port = 9090;
        new_def.enabled = true;
        assert!(sup.update("web", new_def).unwrap());

        assert!(first.lock().exited);
        assert_eq!(sup.spawner.count(), 2);
        assert_eq!(sup.spawner.last_argv()[3], "9090:localhost:80");
        assert_eq!(sup.status("web"), TunnelStatus::Running);
        assert_eq!(stored(&sup, "web").local_port, 9090);
    }

    #[test]
    fn test_update_running_disabled_stays_stopped() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();
        sup.start("web").unwrap();

        assert!(sup.update("web", tunnel("web")).unwrap());
        assert_eq!(sup.spawner.count(), 1);
        assert_eq!(sup.status("web"), TunnelStatus::Stopped);
    }

    #[test]
    fn test_update_stopped_enabled_does_not_start() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();

        let mut new_def = tunnel("web");
        new_def.enabled = true;
        assert!(sup.update("web", new_def).unwrap());
        assert_eq!(sup.spawner.count(), 0);
        assert!(stored(&sup, "web").enabled);
    }

    #[test]
    fn test_update_keeps_key() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();
        assert!(sup.update("web", tunnel("renamed")).unwrap());
        assert_eq!(sup.get("web").unwrap().name, "web");
        assert!(sup.get("renamed").is_none());
    }

    #[test]
    fn test_update_invalid_keeps_old_definition() {
        let mut sup = supervisor();
        sup.add(tunnel("web")).unwrap();

        let mut bad = tunnel("web");
        bad.remote_host = String::new();
        assert!(matches!(sup.update("web", bad), Err(Error::InvalidTunnel(_))));
        assert_eq!(sup.get("web"), Some(&tunnel("web")));
    }

    #[test]
    fn test_stop_all_and_start_enabled() {
        let mut sup = supervisor();
        for name in ["a", "b", "c"] {
            sup.add(tunnel(name)).unwrap();
        }
        sup.start("a").unwrap();
        sup.start("c").unwrap();

        sup.stop_all();
        assert!(sup.tracked().is_empty());
        assert_eq!(sup.status("a"), TunnelStatus::Stopped);

        // stop clears the flag, so re-enable two of them
        for name in ["a", "b"] {
            let mut def = tunnel(name);
            def.enabled = true;
            sup.update(name, def).unwrap();
        }

        let started = sup.start_enabled();
        assert_eq!(
            started,
            vec![
                ("a".to_string(), TunnelStatus::Running),
                ("b".to_string(), TunnelStatus::Running)
            ]
        );
        assert_eq!(sup.tracked(), vec!["a", "b"]);
    }

    #[test]
    fn test_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tunnels.json");

        let mut sup = TunnelSupervisor::new(JsonTunnelStore::with_path(&path), MockSpawner::default());
        sup.add(tunnel("db")).unwrap();
        sup.add(tunnel("web").with_key("/keys/id")).unwrap();
        sup.start("web").unwrap();
        let before = sup.get_all();

        let reloaded =
            TunnelSupervisor::new(JsonTunnelStore::with_path(&path), MockSpawner::default());
        assert_eq!(reloaded.get_all(), before);
        assert!(reloaded.tracked().is_empty());
    }
}
