use crate::areas::refs::DEFAULT_BRANCH;
use crate::areas::repository::Repository;
use crate::artifacts::graph::ObjectGraph;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::pack::PackEncoder;
use crate::artifacts::protocol::smart_http::{Credentials, SmartHttpClient};
use std::io::Write;

/// What a push sent to the remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSummary {
    pub remote: Option<ObjectId>,
    pub local: ObjectId,
    pub objects: usize,
}

impl Repository {
    /// Publish local master to the smart-HTTP remote at `url`
    ///
    /// Sends every object reachable from local master that the remote's master
    /// does not already reach.
    pub async fn push(&mut self, url: &str, credentials: Credentials) -> anyhow::Result<PushSummary> {
        let client = SmartHttpClient::new(url, credentials)?;
        let remote = client.discover_remote_ref().await?;

        let local = self
            .refs()
            .read_master()?
            .ok_or_else(|| anyhow::anyhow!("nothing to push: {DEFAULT_BRANCH} has no commits"))?;

        let missing = ObjectGraph::new(self.database()).missing(&local, remote.as_ref())?;
        let pack = PackEncoder::new(self.database()).create_pack(&missing)?;

        writeln!(
            self.writer(),
            "updating remote {DEFAULT_BRANCH} from {} to {} ({} objects)",
            remote
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "no commits".to_string()),
            local,
            missing.len()
        )?;

        client.send_pack(remote.as_ref(), &local, pack).await?;
        tracing::info!(url = client.url(), %local, objects = missing.len(), "pushed");

        Ok(PushSummary {
            remote,
            local,
            objects: missing.len(),
        })
    }
}
