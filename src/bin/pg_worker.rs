//! Runs embedded `PostgreSQL` lifecycle steps on behalf of a root test runner.
//!
//! `PostgreSQL` refuses to start as root, so when the integration tests run
//! with root privileges the cluster helpers hand each step to this binary:
//!
//! ```text
//! pg_worker <setup|start|stop> <payload.json>
//! ```
//!
//! The payload is a serialized `pg_embedded_setup_unpriv::worker::WorkerPayload`
//! holding the cluster settings and the environment to apply. Arguments and
//! payload are validated first. When started as root the worker then
//! re-executes itself as `nobody` (through `runuser`, or `su` where
//! `runuser` is missing) and drops privileges in-process before touching the
//! data directory.

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    let args = unix::collect_args()?;
    let invocation = unix::Invocation::parse(args.iter().cloned())?;
    let payload = invocation.load_payload()?;
    unix::reexec_unprivileged(&args)?;
    invocation.run(payload).map_err(Into::into)
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker needs a Unix host".into())
}

#[cfg(unix)]
mod unix {
    use super::BoxError;
    use camino::{Utf8Path, Utf8PathBuf};
    use nix::unistd::{Uid, User, initgroups, setgid, setuid};
    use pg_embedded_setup_unpriv::ambient_dir_and_path;
    use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
    use postgresql_embedded::{PostgreSQL, Status};
    use std::env;
    use std::ffi::CString;
    use std::io::{self, Read};
    use std::process::{Command, ExitStatus};
    use thiserror::Error;

    const REEXEC_MARKER: &str = "PG_WORKER_REEXEC";
    const TRUSTED_PATH: &str = "/usr/sbin:/usr/bin:/sbin:/bin";
    const UNPRIVILEGED_USER: &str = "nobody";

    #[derive(Debug, Error)]
    pub(super) enum WorkerError {
        #[error("invalid arguments: {0}")]
        InvalidArgs(String),
        #[error("failed to read worker payload: {0}")]
        PayloadRead(#[source] BoxError),
        #[error("failed to parse worker payload: {0}")]
        PayloadParse(#[source] serde_json::Error),
        #[error("settings conversion failed: {0}")]
        Settings(String),
        #[error("runtime init failed: {0}")]
        Runtime(#[source] io::Error),
        #[error("failed to drop privileges: {0}")]
        PrivilegeDrop(String),
        #[error("postgres {operation} failed: {reason}")]
        Postgres {
            operation: &'static str,
            reason: String,
        },
    }

    #[derive(Debug, Clone, Copy)]
    enum Operation {
        Setup,
        Start,
        Stop,
    }

    impl Operation {
        fn parse(arg: &str) -> Result<Self, WorkerError> {
            match arg {
                "setup" => Ok(Self::Setup),
                "start" => Ok(Self::Start),
                "stop" => Ok(Self::Stop),
                other => Err(WorkerError::InvalidArgs(format!(
                    "unknown operation '{other}'; expected setup, start, or stop"
                ))),
            }
        }

        const fn as_str(self) -> &'static str {
            match self {
                Self::Setup => "setup",
                Self::Start => "start",
                Self::Stop => "stop",
            }
        }
    }

    /// A parsed command line: which step to run and where its payload lives.
    pub(super) struct Invocation {
        operation: Operation,
        payload_path: Utf8PathBuf,
    }

    impl Invocation {
        pub(super) fn parse(
            mut args: impl Iterator<Item = Utf8PathBuf>,
        ) -> Result<Self, WorkerError> {
            let _program = args.next();
            let operation = args
                .next()
                .ok_or_else(|| WorkerError::InvalidArgs("missing operation argument".into()))
                .and_then(|arg| Operation::parse(arg.as_str()))?;
            let payload_path = args
                .next()
                .ok_or_else(|| WorkerError::InvalidArgs("missing config path argument".into()))?;
            if let Some(extra) = args.next() {
                return Err(WorkerError::InvalidArgs(format!(
                    "unexpected extra argument: {extra}"
                )));
            }
            Ok(Self {
                operation,
                payload_path,
            })
        }

        /// Reads and parses the payload file.
        pub(super) fn load_payload(&self) -> Result<WorkerPayload, WorkerError> {
            let read = || -> Result<Vec<u8>, BoxError> {
                let (dir, relative) = ambient_dir_and_path(&self.payload_path)?;
                let mut file = dir.open(relative.as_std_path())?;
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)?;
                Ok(bytes)
            };
            let bytes = read().map_err(WorkerError::PayloadRead)?;
            serde_json::from_slice(&bytes).map_err(WorkerError::PayloadParse)
        }

        pub(super) fn run(self, payload: WorkerPayload) -> Result<(), WorkerError> {
            drop_privileges_if_root()?;
            let settings = payload
                .settings
                .into_settings()
                .map_err(|err| WorkerError::Settings(err.to_string()))?;
            apply_environment(&payload.environment);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(WorkerError::Runtime)?;
            let operation = self.operation;
            let postgres = PostgreSQL::new(settings);
            runtime.block_on(async move {
                match operation {
                    Operation::Setup => {
                        let mut handle = postgres;
                        setup(&mut handle).await?;
                        ensure_started(&mut handle).await
                    }
                    Operation::Start => {
                        let mut handle = postgres;
                        ensure_started(&mut handle).await?;
                        // Dropping the handle would stop the server we just started.
                        std::mem::forget(handle);
                        Ok(())
                    }
                    Operation::Stop => postgres
                        .stop()
                        .await
                        .map_err(|err| postgres_error(operation, &err)),
                }
            })
        }
    }

    fn postgres_error(operation: Operation, err: &impl std::fmt::Display) -> WorkerError {
        WorkerError::Postgres {
            operation: operation.as_str(),
            reason: err.to_string(),
        }
    }

    async fn setup(postgres: &mut PostgreSQL) -> Result<(), WorkerError> {
        postgres
            .setup()
            .await
            .map_err(|err| postgres_error(Operation::Setup, &err))
    }

    async fn ensure_started(postgres: &mut PostgreSQL) -> Result<(), WorkerError> {
        if matches!(postgres.status(), Status::Started) {
            return Ok(());
        }
        postgres
            .start()
            .await
            .map_err(|err| postgres_error(Operation::Start, &err))
    }

    pub(super) fn collect_args() -> Result<Vec<Utf8PathBuf>, WorkerError> {
        env::args_os()
            .map(|arg| {
                arg.into_string()
                    .map(Utf8PathBuf::from)
                    .map_err(|_| WorkerError::InvalidArgs("argument is not valid UTF-8".into()))
            })
            .collect()
    }

    /// Re-runs this binary as the unprivileged user and exits with its status.
    ///
    /// Returns immediately when not root or when already re-executed.
    pub(super) fn reexec_unprivileged(args: &[Utf8PathBuf]) -> Result<(), WorkerError> {
        if !Uid::effective().is_root() || env::var_os(REEXEC_MARKER).is_some() {
            return Ok(());
        }

        let exe = env::current_exe()
            .map_err(WorkerError::Runtime)?
            .into_os_string()
            .into_string()
            .map(Utf8PathBuf::from)
            .map_err(|_| {
                WorkerError::Runtime(io::Error::other("executable path is not valid UTF-8"))
            })?;
        let forwarded = args.get(1..).unwrap_or_default();
        let status = match Command::new("runuser")
            .args(["-u", UNPRIVILEGED_USER, "--"])
            .arg(exe.as_std_path())
            .args(forwarded.iter().map(|arg| arg.as_std_path()))
            .env(REEXEC_MARKER, "1")
            .env("PATH", TRUSTED_PATH)
            .status()
        {
            Ok(status) => status,
            Err(err) if err.kind() == io::ErrorKind::NotFound => reexec_via_su(&exe, forwarded)?,
            Err(err) => return Err(WorkerError::PrivilegeDrop(err.to_string())),
        };

        std::process::exit(status.code().unwrap_or(1));
    }

    fn reexec_via_su(exe: &Utf8Path, forwarded: &[Utf8PathBuf]) -> Result<ExitStatus, WorkerError> {
        let mut command = format!("{REEXEC_MARKER}=1 exec {}", shell_escape(exe.as_str()));
        for arg in forwarded {
            command.push(' ');
            command.push_str(&shell_escape(arg.as_str()));
        }

        Command::new("/bin/su")
            .args(["-s", "/bin/sh", UNPRIVILEGED_USER, "-c"])
            .arg(command)
            .env("PATH", TRUSTED_PATH)
            .status()
            .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))
    }

    fn drop_privileges_if_root() -> Result<(), WorkerError> {
        if !Uid::effective().is_root() {
            return Ok(());
        }
        let denied = |err: nix::Error| WorkerError::PrivilegeDrop(err.to_string());

        let user = User::from_name(UNPRIVILEGED_USER)
            .map_err(denied)?
            .ok_or_else(|| {
                WorkerError::PrivilegeDrop(format!("user '{UNPRIVILEGED_USER}' not found"))
            })?;
        let user_name = CString::new(user.name.clone())
            .map_err(|err| WorkerError::PrivilegeDrop(format!("invalid user name: {err}")))?;
        initgroups(&user_name, user.gid).map_err(denied)?;
        setgid(user.gid).map_err(denied)?;
        setuid(user.uid).map_err(denied)?;

        // SAFETY: the worker is single-threaded until the runtime is built.
        unsafe {
            env::set_var("HOME", &user.dir);
            env::set_var("USER", &user.name);
            env::set_var("LOGNAME", &user.name);
        }
        Ok(())
    }

    fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
        for (key, value) in environment {
            // SAFETY: the worker is single-threaded until the runtime is built.
            unsafe {
                match value {
                    Some(secret) => env::set_var(key, secret.expose()),
                    None => env::remove_var(key),
                }
            }
        }
    }

    /// Wraps `value` in single quotes for a POSIX shell, escaping embedded
    /// quotes as `'\''`.
    fn shell_escape(value: &str) -> String {
        format!("'{}'", value.replace('\'', "'\\''"))
    }

}
