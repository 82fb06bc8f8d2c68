//! `ResolverBus` implementation on the D-Bus system bus.

use tracing::debug;
use zbus::blocking::Connection;
use zbus::blocking::fdo::PropertiesProxy;
use zbus::fdo;
use zbus::names::InterfaceName;
use zbus::zvariant::Value;

use crate::collector::error::CollectError;
use crate::collector::traits::ResolverBus;

/// Well-known bus name of systemd-resolved.
pub const SERVICE_NAME: &str = "org.freedesktop.resolve1";
/// Object path of the resolver manager.
pub const OBJECT_PATH: &str = "/org/freedesktop/resolve1";
/// Interface carrying the statistics properties.
pub const MANAGER_INTERFACE: &str = "org.freedesktop.resolve1.Manager";

/// Reads resolver statistics from the system bus.
///
/// A new connection is opened for every read and dropped before returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBus;

impl SystemBus {
    pub fn new() -> Self {
        Self
    }
}

impl ResolverBus for SystemBus {
    fn read_statistics(&self, properties: &[&str]) -> Result<Vec<Vec<u64>>, CollectError> {
        let connection =
            Connection::system().map_err(|e| CollectError::BusConnect(e.to_string()))?;

        let proxy = PropertiesProxy::builder(&connection)
            .destination(SERVICE_NAME)
            .and_then(|b| b.path(OBJECT_PATH))
            .and_then(|b| b.build())
            .map_err(|e| CollectError::BusConnect(e.to_string()))?;

        let interface = InterfaceName::from_static_str(MANAGER_INTERFACE)
            .map_err(|e| CollectError::BusConnect(e.to_string()))?;

        properties
            .iter()
            .map(|property| {
                let value = proxy
                    .get(interface.clone(), property)
                    .map_err(|e| property_error(property, e))?;
                debug!(property, "fetched property");
                decode_u64_sequence(property, Value::from(value))
            })
            .collect()
    }
}

fn property_error(property: &str, error: fdo::Error) -> CollectError {
    match error {
        fdo::Error::ServiceUnknown(msg) | fdo::Error::NameHasNoOwner(msg) => {
            CollectError::ServiceUnavailable(msg)
        }
        other => CollectError::PropertyRead {
            property: property.to_string(),
            message: other.to_string(),
        },
    }
}

/// Decodes a statistics property into its `u64` values.
///
/// systemd-resolved publishes these as structs (`(ttt)`); a plain `at` array
/// is accepted too. Anything else means an incompatible resolver.
pub(crate) fn decode_u64_sequence(
    property: &str,
    value: Value<'_>,
) -> Result<Vec<u64>, CollectError> {
    let type_error = |message: String| CollectError::PropertyType {
        property: property.to_string(),
        message,
    };

    match value {
        Value::Structure(structure) => structure
            .into_fields()
            .into_iter()
            .map(|field| match field {
                Value::U64(n) => Ok(n),
                other => Err(type_error(format!(
                    "expected u64 field, got {}",
                    other.value_signature()
                ))),
            })
            .collect(),
        Value::Array(array) => Vec::<u64>::try_from(array).map_err(|e| type_error(e.to_string())),
        other => Err(type_error(format!(
            "expected struct or array of u64, got {}",
            other.value_signature()
        ))),
    }
}
