// src/core/split/transaction.rs

//! `SplitTransaction`: the 9-step execute sequence, reversible up to the
//! catalog PONR edit, after which any failure escalates to process abort
//! (spec.md §4.G, §7).

use super::fileops::RegionFileOps;
use super::journal::{inverse_step, Daughter, InverseAction, Journal, JournalEntry};
use crate::core::catalog::Catalog;
use crate::core::errors::AssignError;
use crate::core::metrics;
use crate::core::region::{daughter_region_id, Region, ServerName};
use bytes::Bytes;

#[derive(Debug)]
pub struct SplitTransaction {
    journal: Journal,
}

impl SplitTransaction {
    /// Validates `split_row` and computes the daughter descriptors.
    /// Rejects a split row equal to the parent's start key or outside its
    /// range (spec.md §8 boundary behaviors).
    pub fn prepare(
        parent: &Region,
        split_row: Bytes,
        now_millis: i64,
    ) -> Result<(Self, Region, Region), AssignError> {
        if split_row == parent.start_key {
            return Err(AssignError::InvalidSplitRow(
                "split row must not equal the parent's start key".into(),
            ));
        }
        if !parent.contains(&split_row) {
            return Err(AssignError::InvalidSplitRow(
                "split row must fall strictly inside the parent's range".into(),
            ));
        }

        let region_id = daughter_region_id(parent.region_id, now_millis);
        let daughter_a = Region::new(
            parent.table.clone(),
            parent.start_key.clone(),
            split_row.clone(),
            region_id,
        );
        let daughter_b = Region::new(parent.table.clone(), split_row, parent.end_key.clone(), region_id);

        Ok((Self { journal: Vec::new() }, daughter_a, daughter_b))
    }

    /// Runs the full execute sequence. On failure before the PONR, rolls
    /// back and returns the error. On failure at or after the PONR,
    /// aborts the process: the source of truth is the catalog, and a
    /// consistent in-memory recovery past that point is not possible.
    pub async fn execute(
        &mut self,
        parent: &Region,
        daughter_a: &Region,
        daughter_b: &Region,
        server: &ServerName,
        file_ops: &dyn RegionFileOps,
        catalog: &dyn Catalog,
    ) -> Result<(), AssignError> {
        metrics::inc_split_total();
        if let Err(e) = self.run_pre_ponr(parent, daughter_a, daughter_b, file_ops).await {
            metrics::inc_rollback_total();
            self.rollback(parent, daughter_a, daughter_b, file_ops).await;
            return Err(e);
        }

        if let Err(e) = catalog.offline_parent(parent, daughter_a, daughter_b).await {
            panic!(
                "split transaction for {} failed past point of no return: {e}",
                parent.encoded_name()
            );
        }

        if let Err(e) = self.run_post_ponr(daughter_a, daughter_b, server, file_ops, catalog).await {
            panic!(
                "split transaction for {} failed past point of no return: {e}",
                parent.encoded_name()
            );
        }

        Ok(())
    }

    async fn run_pre_ponr(
        &mut self,
        parent: &Region,
        daughter_a: &Region,
        daughter_b: &Region,
        file_ops: &dyn RegionFileOps,
    ) -> Result<(), AssignError> {
        file_ops.create_split_dir(parent).await?;
        self.journal.push(JournalEntry::CreateSplitDir);

        let store_files = file_ops.close_parent(parent).await?;
        self.journal.push(JournalEntry::ClosedParent);

        file_ops.remove_from_online(parent).await?;
        self.journal.push(JournalEntry::OfflinedParent);

        for store_file in &store_files {
            file_ops
                .create_reference_file(parent, daughter_a, store_file, "bottom")
                .await?;
            file_ops
                .create_reference_file(parent, daughter_b, store_file, "top")
                .await?;
        }

        self.journal.push(JournalEntry::StartedRegion(Daughter::A));
        file_ops.materialize_daughter(daughter_a).await?;

        self.journal.push(JournalEntry::StartedRegion(Daughter::B));
        file_ops.materialize_daughter(daughter_b).await?;

        Ok(())
    }

    async fn run_post_ponr(
        &self,
        daughter_a: &Region,
        daughter_b: &Region,
        server: &ServerName,
        file_ops: &dyn RegionFileOps,
        catalog: &dyn Catalog,
    ) -> Result<(), AssignError> {
        let open_a = async {
            file_ops.add_to_online(daughter_a).await?;
            catalog.update_region_location(daughter_a, server).await
        };
        let open_b = async {
            file_ops.add_to_online(daughter_b).await?;
            catalog.update_region_location(daughter_b, server).await
        };
        tokio::try_join!(open_a, open_b)?;
        Ok(())
    }

    async fn rollback(
        &self,
        parent: &Region,
        daughter_a: &Region,
        daughter_b: &Region,
        file_ops: &dyn RegionFileOps,
    ) {
        for entry in self.journal.iter().rev() {
            let action = inverse_step(*entry);
            let result = match action {
                InverseAction::DeleteDaughterDir(Daughter::B) => file_ops.delete_daughter_dir(daughter_b).await,
                InverseAction::DeleteDaughterDir(Daughter::A) => file_ops.delete_daughter_dir(daughter_a).await,
                InverseAction::ReAddParentOnline => file_ops.add_to_online(parent).await,
                InverseAction::ReopenParentLocally => file_ops.reopen_parent(parent).await,
                InverseAction::DeleteSplitDir => file_ops.delete_split_dir(parent).await,
            };
            if let Err(e) = result {
                panic!("split rollback for {} failed: {e}", parent.encoded_name());
            }
        }
    }
}

/// Crash-recovery-at-next-deploy (spec.md §4.G): on opening `parent`,
/// clean up any leftover split directory. `candidate_daughters` are the
/// daughter descriptors this parent would have produced, used to locate
/// per-daughter detritus; does not discover daughters by directory scan
/// (see spec.md §9's open question about the orphan-daughter-A case).
pub async fn recover_split_detritus(
    parent: &Region,
    candidate_daughters: &[Region],
    file_ops: &dyn RegionFileOps,
) -> Result<(), AssignError> {
    for daughter in candidate_daughters {
        file_ops.delete_daughter_dir(daughter).await?;
    }
    file_ops.delete_split_dir(parent).await?;
    Ok(())
}
