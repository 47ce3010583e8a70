// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile realization: keeps exactly the visible cells attached to the host.

use hashbrown::{HashMap, HashSet};
use kurbo::{Size, Vec2};
use understory_tile_grid::{GridSpec, Reconciliation, VisibleRange, VisibleSet};
use understory_timing::{TimerId, TimerQueue};

use crate::host::{GalleryHost, HostError, LoadTicket, TileContent};
use crate::manifest::Manifest;

/// Image lifecycle of a realized tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageState {
    /// Load in flight; the placeholder is showing.
    Loading(LoadTicket),
    /// The image is showing.
    Loaded,
    /// The load failed; the placeholder stays.
    Failed,
}

#[derive(Debug)]
struct Tile<N> {
    node: N,
    generation: u64,
    image: ImageState,
    exiting: Option<TimerId>,
}

/// Counts from one reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Tiles created.
    pub added: usize,
    /// Tiles whose exit animation started.
    pub removed: usize,
    /// Exiting tiles brought back before their removal.
    pub revived: usize,
    /// Indices whose creation failed; they are retried on the next pass.
    pub failed: usize,
}

impl ReconcileReport {
    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Maps the grid offset to realized host tiles.
///
/// The virtualizer owns every tile node. Cells entering the visible range are
/// created with a placeholder and start loading their image; cells leaving it
/// play an exit animation and are removed once it finishes, unless they came
/// back in the meantime.
#[derive(Debug)]
pub struct ViewportVirtualizer<N> {
    spec: GridSpec,
    buffer: usize,
    exit_ms: f64,
    visible: VisibleSet,
    tiles: HashMap<usize, Tile<N>>,
    loads: HashMap<LoadTicket, (usize, u64)>,
    exits: TimerQueue<(usize, u64)>,
    pending: HashSet<usize>,
    next_generation: u64,
    next_ticket: u64,
}

impl<N> ViewportVirtualizer<N> {
    /// Creates an empty virtualizer for `spec`.
    pub fn new(spec: GridSpec, buffer: usize, exit_ms: f64) -> Self {
        Self {
            spec,
            buffer: buffer.max(1),
            exit_ms: if exit_ms.is_finite() { exit_ms.max(0.0) } else { 0.0 },
            visible: VisibleSet::new(),
            tiles: HashMap::new(),
            loads: HashMap::new(),
            exits: TimerQueue::new(),
            pending: HashSet::new(),
            next_generation: 0,
            next_ticket: 0,
        }
    }

    /// Grid geometry.
    #[must_use]
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Cells currently considered visible.
    #[must_use]
    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    /// Number of attached tile nodes, exiting ones included.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Returns `true` if a node is attached for `index` and not leaving.
    #[must_use]
    pub fn is_live(&self, index: usize) -> bool {
        self.tiles.get(&index).is_some_and(|t| t.exiting.is_none())
    }

    /// Returns `true` if the node for `index` is playing its exit animation.
    #[must_use]
    pub fn is_exiting(&self, index: usize) -> bool {
        self.tiles.get(&index).is_some_and(|t| t.exiting.is_some())
    }

    /// Image state of the tile at `index`.
    #[must_use]
    pub fn image_state(&self, index: usize) -> Option<ImageState> {
        self.tiles.get(&index).map(|t| t.image)
    }

    /// Host node attached for `index`.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&N> {
        self.tiles.get(&index).map(|t| &t.node)
    }

    /// Cells in range for `offset` and `viewport`.
    #[must_use]
    pub fn compute_visible_range(&self, offset: Vec2, viewport: Size) -> VisibleRange {
        understory_tile_grid::compute_visible_range(offset, viewport, &self.spec, self.buffer)
    }

    /// Recomputes the visible range and reconciles tiles against it.
    pub fn update<H>(
        &mut self,
        offset: Vec2,
        viewport: Size,
        manifest: &Manifest,
        now_ms: f64,
        host: &mut H,
    ) -> ReconcileReport
    where
        H: GalleryHost<Node = N>,
    {
        let next = self.compute_visible_range(offset, viewport).to_set();
        self.reconcile(next, manifest, now_ms, host)
    }

    /// Makes `next` the visible set, creating and retiring tiles as needed.
    ///
    /// Indices that failed to materialize earlier and are still visible are
    /// retried.
    pub fn reconcile<H>(
        &mut self,
        next: HashSet<usize>,
        manifest: &Manifest,
        now_ms: f64,
        host: &mut H,
    ) -> ReconcileReport
    where
        H: GalleryHost<Node = N>,
    {
        let Reconciliation { to_add, to_remove } = self.visible.reconcile(next);
        let mut report = ReconcileReport::default();

        for index in to_remove {
            self.pending.remove(&index);
            if self.dematerialize(index, now_ms, host) {
                report.removed += 1;
            }
        }

        let mut retry: Vec<usize> = self
            .pending
            .iter()
            .copied()
            .filter(|index| self.visible.contains(*index))
            .collect();
        retry.sort_unstable();
        self.pending.clear();

        for index in to_add.into_iter().chain(retry) {
            if self.is_exiting(index) {
                self.revive(index, host);
                report.revived += 1;
                continue;
            }
            match self.materialize(index, manifest, host) {
                Ok(true) => report.added += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(index, error = %err, "tile creation failed; will retry");
                    self.pending.insert(index);
                    report.failed += 1;
                }
            }
        }

        if !report.is_empty() {
            tracing::trace!(
                added = report.added,
                removed = report.removed,
                revived = report.revived,
                failed = report.failed,
                visible = self.visible.len(),
                "reconciled tiles"
            );
        }
        report
    }

    /// Creates the tile for `index` with its placeholder and starts its image load.
    ///
    /// Returns `Ok(false)` when a tile already exists or no item lives at
    /// `index`. A failed image load start leaves the placeholder in place.
    pub fn materialize<H>(
        &mut self,
        index: usize,
        manifest: &Manifest,
        host: &mut H,
    ) -> Result<bool, HostError>
    where
        H: GalleryHost<Node = N>,
    {
        if self.tiles.contains_key(&index) {
            return Ok(false);
        }
        let (Some(item), Some(origin)) = (manifest.get(index), self.spec.cell_origin(index)) else {
            return Ok(false);
        };
        let cell = self.spec.cell_size();
        let content = TileContent {
            index,
            image: &item.image,
            caption: &item.caption,
            origin,
            size: Size::new(cell, cell),
        };
        let node = host.create_tile(&content)?;

        let generation = self.next_generation;
        self.next_generation += 1;
        let ticket = LoadTicket::new(self.next_ticket);
        self.next_ticket += 1;

        let image = match host.begin_image_load(&node, &item.image, ticket) {
            Ok(()) => {
                self.loads.insert(ticket, (index, generation));
                ImageState::Loading(ticket)
            }
            Err(err) => {
                tracing::warn!(index, error = %err, "image load could not start; keeping placeholder");
                ImageState::Failed
            }
        };
        self.tiles.insert(
            index,
            Tile {
                node,
                generation,
                image,
                exiting: None,
            },
        );
        Ok(true)
    }

    /// Starts the exit animation for `index` and schedules its removal.
    ///
    /// Returns `false` if no live tile exists for `index`.
    pub fn dematerialize<H>(&mut self, index: usize, now_ms: f64, host: &mut H) -> bool
    where
        H: GalleryHost<Node = N>,
    {
        let Some(tile) = self.tiles.get_mut(&index) else {
            return false;
        };
        if tile.exiting.is_some() {
            return false;
        }
        host.mark_tile_exiting(&tile.node);
        let timer = self
            .exits
            .schedule_after(now_ms, self.exit_ms, (index, tile.generation));
        tile.exiting = Some(timer);
        true
    }

    fn revive<H>(&mut self, index: usize, host: &mut H)
    where
        H: GalleryHost<Node = N>,
    {
        if let Some(tile) = self.tiles.get_mut(&index) {
            if let Some(timer) = tile.exiting.take() {
                self.exits.cancel(timer);
                host.cancel_tile_exit(&tile.node);
            }
        }
    }

    /// Removes the exiting tile for `index` if it is still the one that
    /// started exiting as `generation`.
    pub fn finish_exit<H>(&mut self, index: usize, generation: u64, host: &mut H) -> bool
    where
        H: GalleryHost<Node = N>,
    {
        let current = self
            .tiles
            .get(&index)
            .is_some_and(|t| t.generation == generation && t.exiting.is_some());
        if !current {
            return false;
        }
        let Some(tile) = self.tiles.remove(&index) else {
            return false;
        };
        if let ImageState::Loading(ticket) = tile.image {
            self.loads.remove(&ticket);
        }
        host.remove_tile(tile.node);
        true
    }

    /// Deadline of the next pending tile removal.
    pub fn next_deadline(&mut self) -> Option<f64> {
        self.exits.next_deadline()
    }

    /// Removes every tile whose exit animation ended by `now_ms`.
    pub fn advance<H>(&mut self, now_ms: f64, host: &mut H) -> usize
    where
        H: GalleryHost<Node = N>,
    {
        let mut removed = 0;
        while let Some((_, (index, generation))) = self.exits.pop_due(now_ms) {
            if self.finish_exit(index, generation, host) {
                removed += 1;
            }
        }
        removed
    }

    /// Reports the end of an image load.
    ///
    /// Completions for tiles that were removed (or replaced) since the load
    /// started are dropped. Returns `true` if the image is now showing.
    pub fn image_loaded<H>(
        &mut self,
        ticket: LoadTicket,
        result: Result<(), HostError>,
        host: &mut H,
    ) -> bool
    where
        H: GalleryHost<Node = N>,
    {
        let Some((index, generation)) = self.loads.remove(&ticket) else {
            return false;
        };
        let Some(tile) = self
            .tiles
            .get_mut(&index)
            .filter(|t| t.generation == generation)
        else {
            return false;
        };
        match result {
            Ok(()) => {
                tile.image = ImageState::Loaded;
                host.show_tile_image(&tile.node);
                true
            }
            Err(err) => {
                tracing::warn!(index, error = %err, "image failed to load; keeping placeholder");
                tile.image = ImageState::Failed;
                false
            }
        }
    }

    /// Removes every tile immediately and forgets all state, keeping `spec`.
    pub fn clear<H>(&mut self, host: &mut H)
    where
        H: GalleryHost<Node = N>,
    {
        self.visible.clear();
        self.loads.clear();
        self.exits.clear();
        self.pending.clear();
        let mut tiles: Vec<_> = self.tiles.drain().collect();
        tiles.sort_unstable_by_key(|(index, _)| *index);
        for (_, tile) in tiles {
            host.remove_tile(tile.node);
        }
    }

    /// Replaces the grid geometry, removing every tile.
    pub fn reset<H>(&mut self, spec: GridSpec, host: &mut H)
    where
        H: GalleryHost<Node = N>,
    {
        self.clear(host);
        self.spec = spec;
    }
}
