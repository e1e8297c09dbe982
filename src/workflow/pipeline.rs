//! Ordered provisioning stages and the terminal cleanup phase

use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::state::{ResourceRecord, Stage, WorkflowState};
use crate::config::Config;
use crate::error::{AnfError, Result};
use crate::netapp::models::{
    AccountCreateRequest, CapacityPoolCreateRequest, SnapshotCreateRequest, VolumeCreateRequest,
    VolumeUpdateRequest, VIRTUAL_NETWORKS_API_VERSION,
};
use crate::netapp::operations::NetAppOperations;
use crate::netapp::polling::wait_until_absent;
use crate::uri::{self, AnfResourceKind};

const NFSV3: &str = "NFSv3";
const NFSV41: &str = "NFSv4.1";

/// Drives the sample against a `NetAppOperations` implementation
pub struct Workflow {
    ops: Arc<dyn NetAppOperations>,
    config: Config,
    subscription_id: String,
}

impl Workflow {
    pub fn new(
        ops: Arc<dyn NetAppOperations>,
        config: Config,
        subscription_id: impl Into<String>,
    ) -> Self {
        Self {
            ops,
            config,
            subscription_id: subscription_id.into(),
        }
    }

    /// Run every provisioning stage, then cleanup.
    ///
    /// Never returns an error; failures are recorded in the returned state.
    pub async fn run(&self) -> WorkflowState {
        let mut state = WorkflowState::new(self.config.should_cleanup);
        self.provision(&mut state).await;
        self.cleanup(&mut state).await;
        state
    }

    /// Run forward stages in order, stopping at the first failure
    pub async fn provision(&self, state: &mut WorkflowState) {
        for stage in Stage::PROVISIONING {
            match self.run_stage(stage, state).await {
                Ok(resource_id) => state.mark_succeeded(stage, resource_id),
                Err(e) => {
                    error!("{} failed: {}", stage, e);
                    state.mark_failed(stage, &e);
                    return;
                }
            }
        }
    }

    async fn run_stage(&self, stage: Stage, state: &mut WorkflowState) -> Result<Option<String>> {
        match stage {
            Stage::SubnetCheck => self.check_subnet().await.map(Some),
            Stage::AccountCreate => {
                let record = self.create_account().await?;
                Ok(Some(Self::store(&mut state.resources.account, record)))
            }
            Stage::PoolCreate => {
                let record = self.create_pool().await?;
                Ok(Some(Self::store(&mut state.resources.pool, record)))
            }
            Stage::Nfsv3VolumeCreate => {
                let record = self
                    .create_volume(
                        stage,
                        self.config.nfsv3_volume_name(),
                        NFSV3,
                        None,
                    )
                    .await?;
                Ok(Some(Self::store(&mut state.resources.nfsv3_volume, record)))
            }
            Stage::Nfsv41VolumeCreate => {
                let record = self
                    .create_volume(
                        stage,
                        self.config.nfsv41_volume_name(),
                        NFSV41,
                        None,
                    )
                    .await?;
                Ok(Some(Self::store(&mut state.resources.nfsv41_volume, record)))
            }
            Stage::SnapshotCreate => {
                let (record, guid) = self.create_snapshot().await?;
                state.snapshot_guid = Some(guid);
                Ok(Some(Self::store(&mut state.resources.snapshot, record)))
            }
            Stage::VolumeFromSnapshotCreate => {
                let guid = state.snapshot_guid.clone().ok_or_else(|| {
                    AnfError::invalid_argument("no snapshot is available to restore from")
                })?;
                let record = self
                    .create_volume(
                        stage,
                        self.config.volume_from_snapshot_name(),
                        NFSV3,
                        Some(guid),
                    )
                    .await?;
                Ok(Some(Self::store(
                    &mut state.resources.volume_from_snapshot,
                    record,
                )))
            }
            Stage::VolumeResize => {
                let record = state.resources.nfsv41_volume.clone().ok_or_else(|| {
                    AnfError::invalid_argument("no NFSv4.1 volume is available to resize")
                })?;
                let quota = self.resize_volume(&record).await?;
                state.resized_quota = Some(quota);
                Ok(Some(record.id))
            }
            Stage::Cleanup => Ok(None),
        }
    }

    fn store(slot: &mut Option<ResourceRecord>, record: ResourceRecord) -> String {
        let id = record.id.clone();
        *slot = Some(record);
        id
    }

    async fn check_subnet(&self) -> Result<String> {
        let subnet_id = self.config.subnet_id(&self.subscription_id);
        info!("Checking if subnet {} exists", subnet_id);

        match self
            .ops
            .get_resource_by_id(&subnet_id, VIRTUAL_NETWORKS_API_VERSION)
            .await
        {
            Ok(_) => Ok(subnet_id),
            Err(e) if e.is_not_found() => {
                error!("Subnet {} not found", subnet_id);
                Err(AnfError::not_found(subnet_id))
            }
            Err(e) => {
                error!("An error occurred while checking subnet {}: {}", subnet_id, e);
                Err(e)
            }
        }
    }

    async fn create_account(&self) -> Result<ResourceRecord> {
        info!(
            "Creating Azure NetApp Files account {}",
            self.config.account_name
        );
        let request = AccountCreateRequest {
            resource_group: self.config.resource_group.clone(),
            account_name: self.config.account_name.clone(),
            location: self.config.location.clone(),
            tags: self.config.tags.clone(),
        };

        let account = self.ops.create_account(&request).await?;
        info!("Account successfully created, resource id: {}", account.id);
        Ok(ResourceRecord::new(
            Stage::AccountCreate,
            account.name,
            account.id,
        ))
    }

    async fn create_pool(&self) -> Result<ResourceRecord> {
        info!("Creating capacity pool {}", self.config.pool_name);
        let request = CapacityPoolCreateRequest {
            resource_group: self.config.resource_group.clone(),
            account_name: self.config.account_name.clone(),
            pool_name: self.config.pool_name.clone(),
            location: self.config.location.clone(),
            service_level: self.config.service_level.clone(),
            size_bytes: self.config.pool_size_bytes,
            tags: self.config.tags.clone(),
        };

        let pool = self.ops.create_capacity_pool(&request).await?;
        info!("Capacity pool successfully created, resource id: {}", pool.id);
        Ok(ResourceRecord::new(Stage::PoolCreate, pool.name, pool.id))
    }

    async fn create_volume(
        &self,
        stage: Stage,
        volume_name: String,
        protocol: &str,
        snapshot_id: Option<String>,
    ) -> Result<ResourceRecord> {
        match &snapshot_id {
            Some(guid) => info!(
                "Creating {} volume {} from snapshot {}",
                protocol, volume_name, guid
            ),
            None => info!("Creating {} volume {}", protocol, volume_name),
        }

        let request = VolumeCreateRequest {
            resource_group: self.config.resource_group.clone(),
            account_name: self.config.account_name.clone(),
            pool_name: self.config.pool_name.clone(),
            volume_name,
            location: self.config.location.clone(),
            service_level: self.config.service_level.clone(),
            subnet_id: self.config.subnet_id(&self.subscription_id),
            snapshot_id,
            protocol_types: vec![protocol.to_string()],
            usage_threshold: self.config.volume_size_bytes,
            unix_read_only: false,
            unix_read_write: true,
            tags: self.config.tags.clone(),
        };

        let volume = self.ops.create_volume(&request).await?;
        info!("Volume successfully created, resource id: {}", volume.id);
        Ok(ResourceRecord::new(stage, volume.name, volume.id))
    }

    async fn create_snapshot(&self) -> Result<(ResourceRecord, String)> {
        let snapshot_name = self.config.snapshot_name();
        let volume_name = self.config.nfsv3_volume_name();
        info!("Creating snapshot {} of volume {}", snapshot_name, volume_name);

        let request = SnapshotCreateRequest {
            resource_group: self.config.resource_group.clone(),
            account_name: self.config.account_name.clone(),
            pool_name: self.config.pool_name.clone(),
            volume_name,
            snapshot_name,
            location: self.config.location.clone(),
        };

        let snapshot = self.ops.create_snapshot(&request).await?;
        info!("Snapshot successfully created, resource id: {}", snapshot.id);

        let guid = snapshot.snapshot_id.clone().ok_or_else(|| {
            AnfError::serialization(format!(
                "snapshot {} response did not include a snapshotId",
                snapshot.id
            ))
        })?;
        Ok((
            ResourceRecord::new(Stage::SnapshotCreate, snapshot.name, snapshot.id),
            guid,
        ))
    }

    async fn resize_volume(&self, record: &ResourceRecord) -> Result<u64> {
        Self::check_kind(record, AnfResourceKind::Volume)?;
        let new_size = self.config.volume_size_bytes.saturating_mul(2);
        info!("Resizing volume {} to {} bytes", record.name, new_size);

        let request = VolumeUpdateRequest {
            resource_group: self.config.resource_group.clone(),
            account_name: self.config.account_name.clone(),
            pool_name: self.config.pool_name.clone(),
            volume_name: self.volume_name(record.stage)?,
            location: self.config.location.clone(),
            usage_threshold: Some(new_size),
            tags: self.config.tags.clone(),
        };

        let volume = self.ops.update_volume(&request).await?;
        let quota = volume.usage_threshold.unwrap_or(new_size);
        info!("Volume {} successfully resized to {} bytes", volume.id, quota);
        Ok(quota)
    }

    /// Terminal phase, always invoked once after provisioning.
    ///
    /// Without the cleanup flag nothing is deleted. Otherwise resources are
    /// removed newest first and the first error halts the rest.
    pub async fn cleanup(&self, state: &mut WorkflowState) {
        if !state.cleanup_requested {
            info!("Cleanup was not requested, provisioned resources are left in place");
            state.mark_skipped(Stage::Cleanup);
            return;
        }

        info!("Cleaning up provisioned resources");
        match self.delete_all(state).await {
            Ok(()) => {
                info!("Cleanup completed");
                state.mark_succeeded(Stage::Cleanup, None);
            }
            Err(e) => {
                error!("Cleanup failed: {}", e);
                state.mark_failed(Stage::Cleanup, &e);
            }
        }
    }

    async fn delete_all(&self, state: &WorkflowState) -> Result<()> {
        let resources = &state.resources;

        if let Some(record) = &resources.volume_from_snapshot {
            self.delete_record(record, AnfResourceKind::Volume).await?;
        }

        if let Some(record) = &resources.snapshot {
            self.delete_record(record, AnfResourceKind::Snapshot).await?;
        }

        let volumes = [&resources.nfsv3_volume, &resources.nfsv41_volume]
            .into_iter()
            .flatten()
            .map(|record| self.delete_record(record, AnfResourceKind::Volume));
        for result in join_all(volumes).await {
            result?;
        }

        if let Some(record) = &resources.pool {
            self.delete_record(record, AnfResourceKind::CapacityPool)
                .await?;
        }

        if let Some(record) = &resources.account {
            self.delete_record(record, AnfResourceKind::Account).await?;
        }

        Ok(())
    }

    async fn delete_record(&self, record: &ResourceRecord, kind: AnfResourceKind) -> Result<()> {
        Self::check_kind(record, kind)?;
        let rg = self.config.resource_group.as_str();
        let account = self.config.account_name.as_str();
        let pool = self.config.pool_name.as_str();
        info!("Deleting {} {}", kind, record.id);

        match kind {
            AnfResourceKind::Account => self.ops.delete_account(rg, account).await?,
            AnfResourceKind::CapacityPool => self.ops.delete_capacity_pool(rg, account, pool).await?,
            AnfResourceKind::Volume => {
                let volume = self.volume_name(record.stage)?;
                self.ops.delete_volume(rg, account, pool, &volume).await?
            }
            AnfResourceKind::Snapshot => {
                self.ops
                    .delete_snapshot(
                        rg,
                        account,
                        pool,
                        &self.config.nfsv3_volume_name(),
                        &self.config.snapshot_name(),
                    )
                    .await?
            }
        }

        wait_until_absent(self.ops.as_ref(), &record.id, self.config.poll_options()).await?;
        info!("{} {} successfully deleted", kind, record.id);
        Ok(())
    }

    /// Configured name of the volume created by `stage`
    fn volume_name(&self, stage: Stage) -> Result<String> {
        match stage {
            Stage::Nfsv3VolumeCreate => Ok(self.config.nfsv3_volume_name()),
            Stage::Nfsv41VolumeCreate => Ok(self.config.nfsv41_volume_name()),
            Stage::VolumeFromSnapshotCreate => Ok(self.config.volume_from_snapshot_name()),
            other => Err(AnfError::invalid_argument(format!(
                "{} does not create a volume",
                other
            ))),
        }
    }

    /// Refuse records whose id names a different kind of resource
    fn check_kind(record: &ResourceRecord, expected: AnfResourceKind) -> Result<()> {
        match uri::classify(&record.id) {
            Some(kind) if kind == expected => Ok(()),
            other => {
                let found = other
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "an unrecognized resource".to_string());
                warn!("Refusing to treat {} as a {}", record.id, expected);
                Err(AnfError::invalid_argument(format!(
                    "expected {} to be a {}, found {}",
                    record.id, expected, found
                )))
            }
        }
    }
}
