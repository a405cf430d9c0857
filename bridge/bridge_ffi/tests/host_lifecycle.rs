use bridge_core::{Error, LifecycleError};
use bridge_runtime::RuntimeState;
use rbridge::{runtime_state, start_runtime, stop_runtime};

// The runtime is process-wide, so the whole sequence runs in one test.
#[test]
fn test_host_lifecycle_sequence() {
    assert_eq!(runtime_state(), RuntimeState::Stopped);

    assert!(matches!(
        stop_runtime(),
        Err(Error::Lifecycle(LifecycleError::NotRunning))
    ));

    start_runtime().unwrap();
    assert_eq!(runtime_state(), RuntimeState::Running);

    assert!(matches!(
        start_runtime(),
        Err(Error::Lifecycle(LifecycleError::AlreadyRunning))
    ));
    assert_eq!(runtime_state(), RuntimeState::Running);

    stop_runtime().unwrap();
    assert_eq!(runtime_state(), RuntimeState::Stopped);

    assert!(matches!(
        stop_runtime(),
        Err(Error::Lifecycle(LifecycleError::NotRunning))
    ));
    assert!(matches!(
        start_runtime(),
        Err(Error::Lifecycle(LifecycleError::RestartUnsupported))
    ));
}
