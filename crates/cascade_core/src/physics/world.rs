//! Physics world: body arena, broadphase, contacts and integration

use super::body::RigidBody;
use super::broadphase::{Proxy, SpatialHashGrid};
use super::contact::{circle_circle, pair_mut, segment_circle, Contact, Manifold, SolverParams};
use super::shape::Shape;
use crate::config::PhysicsConfig;
use crate::handle::BodyHandle;
use glam::Vec2;

struct Slot {
    generation: u32,
    body: Option<RigidBody>,
}

/// Owns every rigid body, dynamic and static.
///
/// Removing a body vacates its slot, bumps the slot generation and queues
/// the slot for reuse by the next insert.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
    grid: SpatialHashGrid,
    // Scratch buffers reused across steps
    dynamic_proxies: Vec<Proxy>,
    static_proxies: Vec<Proxy>,
    pairs: Vec<(u32, u32)>,
    contacts: Vec<Contact>,
}

impl PhysicsWorld {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            grid: SpatialHashGrid::new(config.cell_size),
            config,
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            dynamic_proxies: Vec::new(),
            static_proxies: Vec::new(),
            pairs: Vec::new(),
            contacts: Vec::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    /// Number of bodies in the world, static anchors included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, body: RigidBody) -> BodyHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            return BodyHandle::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            body: Some(body),
        });
        BodyHandle::new(index, 0)
    }

    /// Detach a body. Returns `None` when the handle is stale or unknown.
    pub fn remove(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        self.len -= 1;
        Some(body)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&RigidBody> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.body.as_ref()
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.body.as_mut()
    }

    /// Contacts found during the last step.
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Advance every dynamic body by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let gravity = self.config.gravity;
        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            if body.is_dynamic() {
                body.velocity += gravity * dt;
            }
        }

        self.collect_proxies();
        self.grid.rebuild(&self.dynamic_proxies);
        self.grid.pairs(&self.dynamic_proxies, &mut self.pairs);
        self.collect_contacts();

        let params = SolverParams {
            dt,
            bias_factor: self.config.bias_factor,
            slop: self.config.slop,
            restitution_threshold: self.config.restitution_threshold,
        };
        for contact in &mut self.contacts {
            let (sa, sb) = pair_mut(&mut self.slots, contact.body_a as usize, contact.body_b as usize);
            if let (Some(a), Some(b)) = (sa.body.as_ref(), sb.body.as_ref()) {
                contact.prepare(a, b, &params);
            }
        }
        for _ in 0..self.config.iterations {
            for contact in &mut self.contacts {
                let (sa, sb) = pair_mut(&mut self.slots, contact.body_a as usize, contact.body_b as usize);
                if let (Some(a), Some(b)) = (sa.body.as_mut(), sb.body.as_mut()) {
                    contact.apply(a, b);
                }
            }
        }

        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            if body.is_dynamic() {
                body.position += body.velocity * dt;
                body.angle += body.angular_velocity * dt;
            }
        }
    }

    /// Proxy ids pack the slot index in the high bits and the collider index
    /// in the low byte.
    fn collect_proxies(&mut self) {
        self.dynamic_proxies.clear();
        self.static_proxies.clear();
        for (i, slot) in self.slots.iter().enumerate() {
            let Some(body) = slot.body.as_ref() else {
                continue;
            };
            for (c, collider) in body.colliders.iter().enumerate().take(256) {
                let proxy = Proxy {
                    id: ((i as u32) << 8) | c as u32,
                    aabb: collider.shape.aabb(body.position, body.angle),
                };
                if body.is_dynamic() {
                    self.dynamic_proxies.push(proxy);
                } else {
                    self.static_proxies.push(proxy);
                }
            }
        }
    }

    fn collect_contacts(&mut self) {
        self.contacts.clear();
        for &(i, j) in &self.pairs {
            let pa = self.dynamic_proxies[i as usize];
            let pb = self.dynamic_proxies[j as usize];
            if let Some(contact) = narrow_phase(&self.slots, pa.id, pb.id) {
                self.contacts.push(contact);
            }
        }
        for sp in &self.static_proxies {
            for dp in &self.dynamic_proxies {
                if sp.aabb.overlaps(&dp.aabb) {
                    if let Some(contact) = narrow_phase(&self.slots, sp.id, dp.id) {
                        self.contacts.push(contact);
                    }
                }
            }
        }
    }
}

fn narrow_phase(slots: &[Slot], id_a: u32, id_b: u32) -> Option<Contact> {
    let (slot_a, slot_b) = (id_a >> 8, id_b >> 8);
    if slot_a == slot_b {
        return None;
    }
    let body_a = slots[slot_a as usize].body.as_ref()?;
    let body_b = slots[slot_b as usize].body.as_ref()?;
    let col_a = body_a.colliders.get((id_a & 0xff) as usize)?;
    let col_b = body_b.colliders.get((id_b & 0xff) as usize)?;

    let manifold = match (col_a.shape, col_b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(body_a.position, ra, body_b.position, rb)
        }
        (Shape::Segment { a, b, thickness }, Shape::Circle { radius }) => {
            let (wa, wb) = world_segment(body_a, a, b);
            segment_circle(wa, wb, thickness, body_b.position, radius)
        }
        (Shape::Circle { radius }, Shape::Segment { a, b, thickness }) => {
            let (wa, wb) = world_segment(body_b, a, b);
            segment_circle(wa, wb, thickness, body_a.position, radius).map(flip)
        }
        (Shape::Segment { .. }, Shape::Segment { .. }) => None,
    }?;

    Some(Contact::new(
        slot_a,
        slot_b,
        manifold,
        col_a.elasticity * col_b.elasticity,
        col_a.friction * col_b.friction,
    ))
}

fn world_segment(body: &RigidBody, a: Vec2, b: Vec2) -> (Vec2, Vec2) {
    let rot = Vec2::from_angle(body.angle);
    (body.position + rot.rotate(a), body.position + rot.rotate(b))
}

fn flip(mut manifold: Manifold) -> Manifold {
    manifold.normal = -manifold.normal;
    manifold
}
