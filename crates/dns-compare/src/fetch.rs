use std::time::Duration;

use dns::resolver::{self, DEFAULT_TIMEOUT};
use tracing::{debug, warn};

use crate::{
    error::FetchError,
    record::{RecordSet, RecordType},
};

/// Where record sets come from. One call is one query against one server.
pub trait RecordSource: Send + Sync {
    fn try_fetch(
        &self,
        name: &str,
        server: &str,
        record_type: RecordType,
    ) -> Result<RecordSet, FetchError>;

    /// Like [`RecordSource::try_fetch`], but an unreachable or misbehaving server counts
    /// as having no records. The failure is logged and surfaces as a count mismatch.
    fn fetch(&self, name: &str, server: &str, record_type: RecordType) -> RecordSet {
        match self.try_fetch(name, server, record_type) {
            Ok(set) => set,
            Err(e) => {
                warn!(name, server, %record_type, error = %e.source, "lookup failed, treating as empty");
                RecordSet::empty()
            }
        }
    }
}

/// Queries servers over UDP with the `dns` crate.
#[derive(Debug, Clone)]
pub struct UdpFetcher {
    timeout: Duration,
}

impl UdpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for UdpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl RecordSource for UdpFetcher {
    fn try_fetch(
        &self,
        name: &str,
        server: &str,
        record_type: RecordType,
    ) -> Result<RecordSet, FetchError> {
        let packet = resolver::query(name, server, record_type.into(), self.timeout).map_err(
            |source| FetchError {
                name: name.into(),
                server: server.into(),
                record_type,
                source,
            },
        )?;

        let set = RecordSet::from_answers(record_type, &packet.answers);
        debug!(
            name,
            server,
            %record_type,
            answers = packet.answers.len(),
            records = set.len(),
            "fetched"
        );
        Ok(set)
    }
}
