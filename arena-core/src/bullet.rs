use arena_proto::TeamId;

/// A ballistic entity owned by the game manager's bullet table (§3, C4).
#[derive(Clone, Debug)]
pub struct Bullet {
    pub id: u16,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub owner: u16,
    pub team: TeamId,
    pub damage: f32,
    pub age: f32,
    pub lifetime: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Bullet {
    /// `vy = -speed*sin(theta)`: the Y-inversion matches the angle
    /// convention used throughout the gun/FOV code (§4.4).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u16,
        x: f32,
        y: f32,
        speed: f32,
        theta: f32,
        owner: u16,
        team: TeamId,
        damage: f32,
        lifetime: f32,
        radius: f32,
    ) -> Self {
        Self {
            id,
            x,
            y,
            radius,
            owner,
            team,
            damage,
            age: 0.0,
            lifetime,
            vx: speed * theta.cos(),
            vy: -speed * theta.sin(),
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.age += dt;
    }

    pub fn is_alive(&self) -> bool {
        self.age < self.lifetime
    }
}
