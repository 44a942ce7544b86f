//! Real-time scheduling helpers (Linux SCHED_FIFO / affinity / mlockall).
//!
//! Applied at most once per process. Every step is best effort: a failure is
//! logged as a warning and the run continues with normal scheduling.

use crate::cli::RtLock;

#[cfg(target_os = "linux")]
pub fn setup_rt_once(rt: bool, prio: Option<i32>, lock: RtLock, rt_cpu: Option<usize>) {
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();

    if !rt {
        return;
    }
    RT_ONCE.get_or_init(|| {
        match apply_mem_lock(lock) {
            Ok(()) => tracing::info!(?lock, "RT: memory lock applied"),
            Err(err) => tracing::warn!(error = %err, "RT: mlockall failed"),
        }
        match apply_fifo_priority(prio) {
            Ok(p) => tracing::info!(prio = p, "RT: SCHED_FIFO enabled"),
            Err(err) => tracing::warn!(error = %err, "RT: SCHED_FIFO not applied"),
        }
        let cpu = rt_cpu.unwrap_or(0);
        match apply_affinity(cpu) {
            Ok(()) => tracing::info!(cpu, "RT: pinned to CPU"),
            Err(err) => tracing::warn!(cpu, error = %err, "RT: affinity not applied"),
        }
    });
}

#[cfg(not(target_os = "linux"))]
pub fn setup_rt_once(rt: bool, _prio: Option<i32>, _lock: RtLock, _rt_cpu: Option<usize>) {
    if rt {
        tracing::warn!("RT: real-time mode is only supported on Linux; ignoring --rt");
    }
}

#[cfg(target_os = "linux")]
fn apply_mem_lock(lock: RtLock) -> eyre::Result<()> {
    let flags = match lock {
        RtLock::None => return Ok(()),
        RtLock::Current => libc::MCL_CURRENT,
        RtLock::All => libc::MCL_CURRENT | libc::MCL_FUTURE,
    };
    // SAFETY: mlockall only reads its flag argument.
    let rc = unsafe { libc::mlockall(flags) };
    if rc == 0 {
        return Ok(());
    }
    let err = std::io::Error::last_os_error();
    if matches!(err.raw_os_error(), Some(code) if code == libc::EPERM || code == libc::ENOMEM) {
        eyre::bail!("{err}; hint: needs CAP_IPC_LOCK (or root) and sufficient 'ulimit -l'");
    }
    Err(eyre::eyre!(err))
}

#[cfg(target_os = "linux")]
fn apply_fifo_priority(prio: Option<i32>) -> eyre::Result<i32> {
    // SAFETY: plain queries with no pointer arguments.
    let (min, max) = unsafe {
        let min = libc::sched_get_priority_min(libc::SCHED_FIFO);
        let max = libc::sched_get_priority_max(libc::SCHED_FIFO);
        if min < 0 || max < 0 { (1, 99) } else { (min, max) }
    };
    let prio = prio.unwrap_or(max).clamp(min, max);
    let param = libc::sched_param {
        sched_priority: prio,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling process.
    let rc = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        eyre::bail!("{err}; hint: needs CAP_SYS_NICE or root");
    }
    Ok(prio)
}

#[cfg(target_os = "linux")]
fn apply_affinity(cpu: usize) -> eyre::Result<()> {
    let capacity = std::mem::size_of::<libc::cpu_set_t>() * 8;
    if cpu >= capacity {
        eyre::bail!("requested CPU {cpu} exceeds cpu_set_t capacity {capacity}");
    }
    // SAFETY: cpu_set_t is plain data; zeroed is a valid empty set and the
    // CPU_* helpers stay within it because `cpu < capacity`.
    unsafe {
        let mut allowed: libc::cpu_set_t = std::mem::zeroed();
        if libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut allowed) != 0 {
            return Err(eyre::eyre!(std::io::Error::last_os_error()));
        }
        if !libc::CPU_ISSET(cpu, &allowed) {
            eyre::bail!("CPU {cpu} not permitted by current affinity mask");
        }
        let mut desired: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut desired);
        libc::CPU_SET(cpu, &mut desired);
        if libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &desired) != 0 {
            return Err(eyre::eyre!(std::io::Error::last_os_error()));
        }
    }
    Ok(())
}
