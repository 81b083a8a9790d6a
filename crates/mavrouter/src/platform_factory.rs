use mavrouter_core::ProcessManagerFactory;

/// Platform-independent factory that selects the appropriate implementation at compile time
pub struct PlatformProcessManagerFactory;

impl ProcessManagerFactory for PlatformProcessManagerFactory {
    #[cfg(unix)]
    type Manager = mavrouter_unix::UnixProcessManager;

    #[cfg(windows)]
    type Manager = mavrouter_windows::WindowsProcessManager;

    fn create_process_manager() -> Self::Manager {
        #[cfg(unix)]
        return mavrouter_unix::UnixProcessManagerFactory::create_process_manager();

        #[cfg(windows)]
        return mavrouter_windows::WindowsProcessManagerFactory::create_process_manager();
    }

    fn platform_name() -> &'static str {
        #[cfg(unix)]
        return mavrouter_unix::UnixProcessManagerFactory::platform_name();

        #[cfg(windows)]
        return mavrouter_windows::WindowsProcessManagerFactory::platform_name();
    }
}

/// Process manager for the platform this binary was built for
pub type PlatformProcessManager = <PlatformProcessManagerFactory as ProcessManagerFactory>::Manager;
