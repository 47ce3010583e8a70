// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Size, Vec2};
use understory_gallery::{
    CopyTicket, FrameHandle, GalleryConfig, GalleryHost, GridViewController, HostError,
    LoadTicket, Manifest, ManifestItem, PointerSample, TileContent,
};

/// Host that only counts nodes.
#[derive(Default)]
struct NullHost {
    nodes: u32,
    frames: u64,
}

impl GalleryHost for NullHost {
    type Node = u32;

    fn set_grid_size(&mut self, _size: Size) {}

    fn set_grid_offset(&mut self, offset: Vec2) {
        black_box(offset);
    }

    fn create_tile(&mut self, _tile: &TileContent<'_>) -> Result<u32, HostError> {
        self.nodes += 1;
        Ok(self.nodes)
    }

    fn begin_image_load(&mut self, _: &u32, _: &str, _: LoadTicket) -> Result<(), HostError> {
        Ok(())
    }

    fn show_tile_image(&mut self, _: &u32) {}

    fn mark_tile_exiting(&mut self, _: &u32) {}

    fn cancel_tile_exit(&mut self, _: &u32) {}

    fn remove_tile(&mut self, _: u32) {}

    fn request_frame(&mut self) -> FrameHandle {
        self.frames += 1;
        FrameHandle::new(self.frames)
    }

    fn cancel_frame(&mut self, _: FrameHandle) {}

    fn open_lightbox(&mut self, _: &ManifestItem, _: usize) {}

    fn close_lightbox(&mut self) {}

    fn copy_image(&mut self, _: &ManifestItem, _: CopyTicket) -> Result<(), HostError> {
        Ok(())
    }

    fn notify(&mut self, _: &str) {}
}

fn manifest_json(items: usize) -> String {
    let items: Vec<_> = (0..items)
        .map(|i| {
            serde_json::json!({
                "img": format!("assets/images/{i}.webp"),
                "caption": format!("Image {i}")
            })
        })
        .collect();
    serde_json::to_string(&items).unwrap()
}

fn mount(manifest: &Manifest) -> GridViewController<NullHost> {
    GridViewController::new(
        GalleryConfig::default(),
        manifest.clone(),
        Size::new(1920.0, 1080.0),
        NullHost::default(),
        0.0,
    )
    .unwrap()
}

fn bench_manifest(c: &mut Criterion) {
    let json = manifest_json(5_000);
    c.bench_function("gallery/manifest_from_json(5000)", |b| {
        b.iter(|| black_box(Manifest::from_json(black_box(&json)).unwrap().len()));
    });
}

fn bench_fling(c: &mut Criterion) {
    let manifest = Manifest::from_json(&manifest_json(5_000)).unwrap();
    c.bench_function("gallery/drag_then_fling", |b| {
        b.iter_batched(
            || mount(&manifest),
            |mut gallery| {
                gallery.pointer_down(PointerSample::new(Point::new(1_000.0, 900.0), 0.0));
                for i in 1..=30 {
                    let t = f64::from(i) * 16.0;
                    let p = Point::new(1_000.0 - 10.0 * f64::from(i), 900.0 - 25.0 * f64::from(i));
                    gallery.pointer_move(PointerSample::new(p, t));
                }
                gallery.pointer_up(PointerSample::new(Point::new(700.0, 150.0), 480.0));
                let mut now = 480.0;
                while let Some(handle) = gallery.pending_frame() {
                    now += 16.0;
                    gallery.animation_frame(handle, now);
                }
                gallery.advance_timers(now + 1_000.0);
                black_box(gallery.virtualizer().tile_count())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_manifest, bench_fling);
criterion_main!(benches);
