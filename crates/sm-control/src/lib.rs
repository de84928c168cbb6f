//! The control loop: reconciles sensors discovered on the platform
//! against the driver containers, users, SLA templates and service
//! instances the platform needs to exist for each hardware model.

pub mod driver_spec;
pub mod known_sensors;
pub mod loop_state;

pub use driver_spec::{driver_spec_for_sensor, ContainerMapping, DriverEnvironmentContext, MappingError};
pub use known_sensors::KnownSensors;
pub use loop_state::{
    run, ControlLoopConfig, CIMI_PASSWORD, CIMI_SLA_TEMPLATE_NAME, CIMI_USERNAME,
};
