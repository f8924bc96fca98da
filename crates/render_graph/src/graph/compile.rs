//! The graph compiler: validate, schedule, cull, analyze lifetimes,
//! allocate, and precompute barriers.
//!
//! Grounded on `render::pipeline::pipeline_manager`'s habit
//! of building owned, compiled state up front rather than re-deriving it
//! every frame. The pass-dependency graph this compiler schedules over
//! follows the shape of other pass-graph renderers in the wild (an
//! explicit dependency graph of passes/resources, rebuilt per compile
//! rather than per frame), but the scheduling algorithm itself — Kahn's
//! algorithm over a hand-rolled adjacency list — is this crate's own small
//! implementation of the textbook algorithm. Pulling in `petgraph` for it
//! would depart from the existing dependency stack for no other purpose.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::Result;

use super::barrier::infer_schedule_barriers;
use super::graph::{compile_err, CompiledSchedule, RenderGraph};
use super::pass::PassFlags;
use super::resource::{GraphBackend, GraphBufferHandle, ImageHandle, ResourceFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ResourceKey {
    Image(ImageHandle),
    Buffer(GraphBufferHandle),
}

#[derive(Default)]
struct Accesses {
    writers: Vec<usize>,
    readers: Vec<usize>,
}

impl<B: GraphBackend> RenderGraph<B> {
    /// Run the full compile algorithm. On failure the graph is left with
    /// its previous compiled state (or uncompiled) untouched, so callers
    /// can fix declarations and retry.
    pub fn compile(&mut self) -> Result<()> {
        self.validate()?;

        let (adjacency, in_degree, data_edges) = self.build_dependency_graph();
        let topo_order = kahn_schedule(&adjacency, in_degree)
            .ok_or_else(|| compile_err("cycle detected among pass resource dependencies"))?;

        let kept = self.cull(&topo_order, &data_edges);
        let pass_order: Vec<usize> = topo_order.into_iter().filter(|&p| kept[p]).collect();

        let pool_owner = self.assign_transient_pools(&pass_order);
        self.allocate_physical(&pool_owner);

        let barriers = infer_schedule_barriers(&pass_order, &self.passes, &self.resources);

        self.schedule = Some(CompiledSchedule {
            pass_order,
            barriers,
            pool_owner,
        });
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let mut present_is_attachment = self.present_image.is_none();
        for pass in &self.passes {
            for attachment in pass
                .color_attachments
                .iter()
                .chain(pass.depth_attachment.as_ref())
            {
                if self.resources.image(attachment.image_handle).is_none() {
                    return Err(compile_err(format!(
                        "pass '{}' references a dead image handle",
                        pass.name
                    )));
                }
                if Some(attachment.image_handle) == self.present_image {
                    present_is_attachment = true;
                }
            }
            if let Some(depth) = &pass.depth_attachment {
                if depth.read_only && matches!(depth.load_op, super::pass::LoadOp::Clear) {
                    return Err(compile_err(format!(
                        "pass '{}' clears a read-only depth attachment",
                        pass.name
                    )));
                }
            }
            for &image in &pass.image_reads {
                if self.resources.image(image).is_none() {
                    return Err(compile_err(format!(
                        "pass '{}' reads a dead image handle",
                        pass.name
                    )));
                }
            }
            for &image in &pass.image_writes {
                if self.resources.image(image).is_none() {
                    return Err(compile_err(format!(
                        "pass '{}' writes a dead image handle",
                        pass.name
                    )));
                }
            }
            if let Some(name) = &pass.execute_name {
                if pass.execute.is_none() && !self.executors.contains_key(name) {
                    return Err(compile_err(format!(
                        "pass '{}' names unresolved executor '{}'",
                        pass.name, name
                    )));
                }
            }
        }
        if !present_is_attachment {
            return Err(compile_err(
                "present image is not a color attachment of any pass",
            ));
        }
        Ok(())
    }

    fn build_dependency_graph(&self) -> (Vec<Vec<usize>>, Vec<usize>, Vec<Vec<usize>>) {
        let n = self.passes.len();
        let mut per_resource: HashMap<ResourceKey, Accesses> = HashMap::new();
        for (index, pass) in self.passes.iter().enumerate() {
            for image in pass.all_image_writes() {
                per_resource.entry(ResourceKey::Image(image)).or_default().writers.push(index);
            }
            for image in pass.all_image_reads() {
                per_resource.entry(ResourceKey::Image(image)).or_default().readers.push(index);
            }
            for &buffer in &pass.buffer_writes {
                per_resource.entry(ResourceKey::Buffer(buffer)).or_default().writers.push(index);
            }
            for &buffer in &pass.buffer_reads {
                per_resource.entry(ResourceKey::Buffer(buffer)).or_default().readers.push(index);
            }
        }

        let mut adjacency = vec![Vec::new(); n];
        let mut data_edges = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];
        let mut seen_edges: HashSet<(usize, usize)> = HashSet::new();

        for accesses in per_resource.values() {
            for &w in &accesses.writers {
                for &r in &accesses.readers {
                    if w != r {
                        data_edges[w].push(r);
                        if seen_edges.insert((w, r)) {
                            adjacency[w].push(r);
                            in_degree[r] += 1;
                        }
                    }
                }
            }
            for i in 0..accesses.writers.len() {
                for j in 0..accesses.writers.len() {
                    let (a, b) = (accesses.writers[i], accesses.writers[j]);
                    if a < b && seen_edges.insert((a, b)) {
                        adjacency[a].push(b);
                        in_degree[b] += 1;
                    }
                }
            }
        }

        (adjacency, in_degree, data_edges)
    }

    fn cull(&self, topo_order: &[usize], data_edges: &[Vec<usize>]) -> Vec<bool> {
        let n = self.passes.len();
        let mut kept = vec![false; n];
        let is_terminal = |pass_index: usize| {
            let pass = &self.passes[pass_index];
            pass.all_image_writes().any(|image| {
                Some(image) == self.present_image || self.exported_images.contains(&image)
            }) || pass
                .buffer_writes
                .iter()
                .any(|buffer| self.exported_buffers.contains(buffer))
        };
        for &pass_index in topo_order.iter().rev() {
            let pass = &self.passes[pass_index];
            kept[pass_index] = pass.flags.contains(PassFlags::NO_CULL)
                || is_terminal(pass_index)
                || data_edges[pass_index].iter().any(|&successor| kept[successor]);
        }
        kept
    }

    fn assign_transient_pools(&self, pass_order: &[usize]) -> HashMap<ImageHandle, ImageHandle> {
        let mut position_of = HashMap::new();
        for (position, &pass_index) in pass_order.iter().enumerate() {
            position_of.insert(pass_index, position);
        }

        let mut lifetime: HashMap<ImageHandle, (usize, usize)> = HashMap::new();
        for &pass_index in pass_order {
            let position = position_of[&pass_index];
            let pass = &self.passes[pass_index];
            for image in pass.all_image_writes().chain(pass.all_image_reads()) {
                let Some(resource) = self.resources.image(image) else {
                    continue;
                };
                if !resource.flags.contains(ResourceFlags::TRANSIENT) {
                    continue;
                }
                let entry = lifetime.entry(image).or_insert((position, position));
                entry.0 = entry.0.min(position);
                entry.1 = entry.1.max(position);
            }
        }

        let mut by_first_use: Vec<(ImageHandle, usize, usize)> =
            lifetime.into_iter().map(|(h, (first, last))| (h, first, last)).collect();
        by_first_use.sort_by_key(|&(_, first, _)| first);

        let mut slots: Vec<(ImageHandle, usize)> = Vec::new();
        let mut owner = HashMap::new();
        for (image, first, last) in by_first_use {
            if let Some(slot) = slots.iter_mut().find(|(_, free_at)| *free_at < first) {
                owner.insert(image, slot.0);
                slot.1 = last;
            } else {
                owner.insert(image, image);
                slots.push((image, last));
            }
        }
        owner
    }

    fn allocate_physical(&mut self, pool_owner: &HashMap<ImageHandle, ImageHandle>) {
        let image_count = self.resources.image_count();
        let mut distinct_owners: Vec<ImageHandle> = pool_owner.values().copied().collect();
        distinct_owners.sort_by_key(|h| h.id());
        distinct_owners.dedup();
        for owner in distinct_owners {
            let per_image = self
                .resources
                .image(owner)
                .is_some_and(|r| r.flags.contains(ResourceFlags::PER_IMAGE));
            if per_image {
                for index in 0..image_count {
                    self.resources.allocate_image(owner, index, &mut self.backend);
                }
            } else {
                self.resources.allocate_image(owner, 0, &mut self.backend);
            }
        }
    }
}

/// Kahn's algorithm with a min-index tie-break among ready nodes, which
/// gives the declaration-order determinism the compiler promises.
fn kahn_schedule(adjacency: &[Vec<usize>], mut in_degree: Vec<usize>) -> Option<Vec<usize>> {
    let n = adjacency.len();
    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(&next) = ready.iter().next() {
        ready.remove(&next);
        order.push(next);
        for &successor in &adjacency[next] {
            in_degree[successor] -= 1;
            if in_degree[successor] == 0 {
                ready.insert(successor);
            }
        }
    }
    if order.len() == n {
        Some(order)
    } else {
        None
    }
}
