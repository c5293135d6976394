//! Static line-segment surfaces and their registry.
//!
//! Surfaces are immutable once registered. Each carries an outward unit
//! normal derived from its endpoint order, friction-like adhesion
//! coefficients, and a flag marking it as a bubble generation source.

use crate::config::AdhesionParameters;
use glam::Vec2;

/// A static line segment bubbles can adhere to.
#[derive(Debug, Clone)]
pub struct Surface {
    /// Registry-assigned identifier (equals the registry index)
    pub id: usize,
    /// First endpoint
    pub start: Vec2,
    /// Second endpoint
    pub end: Vec2,
    /// Unit normal pointing toward the fluid
    pub normal: Vec2,
    /// Static adhesion coefficient
    pub static_adhesion: f32,
    /// Dynamic adhesion coefficient
    pub dynamic_adhesion: f32,
    /// Whether bubbles may spawn on this surface
    pub allows_generation: bool,
    /// Display color for the renderer (RGB)
    pub color: [f32; 3],
    adhesion_overridden: bool,
}

impl Surface {
    /// Create a surface between two endpoints.
    ///
    /// The normal is derived as `normalize((-d.y, d.x))` for
    /// `d = end - start`; pass the endpoints in the orientation that yields
    /// the intended outward direction, or override it with
    /// [`Surface::with_normal`]. The sign is not otherwise validated.
    ///
    /// Adhesion starts at the stock coefficients; surfaces registered with
    /// the simulator without a [`Surface::with_adhesion`] override pick up
    /// the configured world defaults instead.
    pub fn new(start: Vec2, end: Vec2) -> Self {
        let direction = end - start;
        let normal = Vec2::new(-direction.y, direction.x).normalize_or_zero();
        let adhesion = AdhesionParameters::default();
        Self {
            id: 0,
            start,
            end,
            normal,
            static_adhesion: adhesion.static_coefficient,
            dynamic_adhesion: adhesion.dynamic_coefficient,
            allows_generation: false,
            color: [0.6, 0.6, 0.7],
            adhesion_overridden: false,
        }
    }

    /// Override the derived normal (must be unit length).
    pub fn with_normal(mut self, normal: Vec2) -> Self {
        self.normal = normal;
        self
    }

    /// Override the adhesion coefficients for this surface.
    pub fn with_adhesion(mut self, static_adhesion: f32, dynamic_adhesion: f32) -> Self {
        self.static_adhesion = static_adhesion;
        self.dynamic_adhesion = dynamic_adhesion;
        self.adhesion_overridden = true;
        self
    }

    /// Whether [`Surface::with_adhesion`] was applied.
    pub fn has_adhesion_override(&self) -> bool {
        self.adhesion_overridden
    }

    /// Mark this surface as a bubble generation source.
    pub fn generating(mut self) -> Self {
        self.allows_generation = true;
        self
    }

    /// Set the display color.
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    /// Point at parameter `t` along the segment (`t` in `[0, 1]`).
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.start + (self.end - self.start) * t
    }

    /// Closest point on the segment to `position` (projection clamped to
    /// the endpoints).
    pub fn closest_point(&self, position: Vec2) -> Vec2 {
        let segment = self.end - self.start;
        let length_sq = segment.length_squared();
        if length_sq < 1e-8 {
            return self.start;
        }
        let t = ((position - self.start).dot(segment) / length_sq).clamp(0.0, 1.0);
        self.start + segment * t
    }

    /// Unit tangent direction, the normal rotated 90 degrees.
    pub fn tangent(&self) -> Vec2 {
        Vec2::new(self.normal.y, -self.normal.x)
    }
}

/// Append-only list of surfaces, populated at setup time and immutable
/// during simulation.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: Vec<Surface>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface, assigning it the next id. Returns the id.
    pub fn add(&mut self, mut surface: Surface) -> usize {
        let id = self.surfaces.len();
        surface.id = id;
        self.surfaces.push(surface);
        id
    }

    /// All registered surfaces, in registration order.
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Surface by id, if registered.
    pub fn get(&self, id: usize) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}
