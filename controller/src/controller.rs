//! The first-person controller: owns locomotion, force memory and the camera
//! rig, and drives a [`PhysicsBody`] once per physics tick.

use std::sync::Arc;

use bevy::prelude::*;
use serde::Serialize;

use crate::camera::{eye_position, CameraRig};
use crate::error::ControllerError;
use crate::friction;
use crate::ground::{GroundInfo, GroundSensor, PROBE_RADIUS_SCALE};
use crate::input::ControllerAction;
use crate::integrator::{self, IntegrationInput, MotionMemory};
use crate::locomotion::LocomotionState;
use crate::physics::{BodyConfig, CapsuleShape, PhysicsBody, SurfaceFriction};
use crate::settings::MovementSettings;

/// Extra headroom required above a standing capsule before a stand-up is granted.
const STAND_UP_MARGIN: f32 = 0.05;

/// Read-only snapshot for HUDs, logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionState {
    pub grounded: bool,
    pub surface_angle: f32,
    /// Horizontal speed (m/s).
    pub speed: f32,
    pub target_speed: f32,
    pub crouching: bool,
    pub running: bool,
    pub paused: bool,
    pub frozen: bool,
    pub standing_up_pending: bool,
}

#[derive(Component, Debug, Clone)]
pub struct FirstPersonController {
    settings: Arc<MovementSettings>,
    locomotion: LocomotionState,
    memory: MotionMemory,
    rig: CameraRig,
    sensor: GroundSensor,
    /// Latched movement input, held until replaced or paused.
    input: Vec2,
    ground: GroundInfo,
    tick: u64,
    /// Take-off in progress: no stick-to-ground until the body leaves the
    /// probe range or stops rising.
    jumped: bool,
    active: bool,
    initialized: bool,
}

impl Default for FirstPersonController {
    fn default() -> Self {
        Self::build(Arc::new(MovementSettings::default()))
    }
}

impl FirstPersonController {
    /// Create a controller. Fails on invalid settings; the body is attached by [`Self::init`].
    pub fn new(settings: Arc<MovementSettings>) -> Result<Self, ControllerError> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    fn build(settings: Arc<MovementSettings>) -> Self {
        let sensor = GroundSensor::new(settings.radius, settings.ground_probe_distance);
        Self {
            settings,
            locomotion: LocomotionState::default(),
            memory: MotionMemory::default(),
            rig: CameraRig::default(),
            sensor,
            input: Vec2::ZERO,
            ground: GroundInfo::AIRBORNE,
            tick: 0,
            jumped: false,
            active: true,
            initialized: false,
        }
    }

    /// Configure the body and reset all state. Must succeed before any tick does anything.
    pub fn init<B: PhysicsBody + ?Sized>(&mut self, body: &mut B) -> Result<(), ControllerError> {
        body.configure(&BodyConfig {
            mass: self.settings.mass,
            capsule: self.standing_capsule(),
            friction: SurfaceFriction::ZERO,
        })?;

        self.locomotion = LocomotionState::default();
        self.memory.reset();
        self.sensor.invalidate();
        self.input = Vec2::ZERO;
        self.ground = self.sensor.probe(body);
        self.jumped = false;
        self.rig = CameraRig::default();
        self.rig.set_active(self.active);
        self.rig.set_target(self.eye(body));
        self.rig.snap();
        self.initialized = true;

        info!(
            "First-person controller ready at {:?} (walk {} m/s, height {} m)",
            body.position(),
            self.settings.walk_speed,
            self.settings.height
        );
        Ok(())
    }

    pub fn settings(&self) -> &Arc<MovementSettings> {
        &self.settings
    }

    /// Swap in new settings between ticks. The capsule is resized for the current stance.
    pub fn set_settings<B: PhysicsBody + ?Sized>(
        &mut self,
        settings: Arc<MovementSettings>,
        body: &mut B,
    ) -> Result<(), ControllerError> {
        settings.validate()?;
        self.settings = settings;
        self.sensor = GroundSensor::new(self.settings.radius, self.settings.ground_probe_distance);
        if self.initialized {
            body.set_capsule(self.current_capsule());
        }
        debug!("Movement settings replaced");
        Ok(())
    }

    pub fn locomotion(&self) -> &LocomotionState {
        &self.locomotion
    }

    pub fn memory(&self) -> &MotionMemory {
        &self.memory
    }

    pub fn camera(&self) -> &CameraRig {
        &self.rig
    }

    /// Currently latched movement input.
    pub fn input(&self) -> Vec2 {
        self.input
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of physics ticks run so far.
    pub fn physics_ticks(&self) -> u64 {
        self.tick
    }

    // --- input ---

    /// Latch horizontal (strafe) and vertical (forward) input.
    pub fn move_axes(&mut self, horizontal: f32, vertical: f32, clamp: bool) {
        if self.locomotion.is_paused() {
            return;
        }
        let mut input = Vec2::new(horizontal, vertical);
        if !input.is_finite() {
            input = Vec2::ZERO;
        }
        if clamp {
            input = input.clamp(Vec2::NEG_ONE, Vec2::ONE);
        }
        self.input = input;
    }

    /// Look by `horizontal` degrees of yaw (turns the body) and `vertical` degrees of pitch.
    pub fn look<B: PhysicsBody + ?Sized>(&mut self, body: &mut B, horizontal: f32, vertical: f32) {
        if self.locomotion.is_paused() || !self.active {
            return;
        }
        if horizontal.is_finite() && horizontal != 0.0 {
            let yaw = Quat::from_rotation_y(-horizontal.to_radians());
            body.set_rotation(yaw * body.rotation());
        }
        self.rig.add_pitch(vertical, &self.settings.camera);
    }

    /// Jump if the body is on the ground right now.
    pub fn jump<B: PhysicsBody + ?Sized>(&mut self, body: &mut B) -> bool {
        if self.locomotion.is_paused() || !self.active || !self.initialized {
            return false;
        }
        if !self.sensor.probe(body).grounded {
            return false;
        }
        body.add_velocity_change(Vec3::Y * self.settings.jump_impulse);
        self.jumped = true;
        debug!("Jump");
        true
    }

    pub fn crouch_down<B: PhysicsBody + ?Sized>(&mut self, body: &mut B) -> bool {
        if !self.locomotion.crouch_down() {
            return false;
        }
        body.set_capsule(self.current_capsule());
        debug!("Crouch down");
        true
    }

    /// Request to stand. Happens on a later physics tick once there is headroom.
    pub fn crouch_up(&mut self) -> bool {
        let requested = self.locomotion.crouch_up();
        if requested {
            debug!("Stand-up requested");
        }
        requested
    }

    /// Grant a pending stand-up if nothing blocks the standing capsule.
    pub fn resolve_stand_up<B: PhysicsBody + ?Sized>(&mut self, body: &mut B) -> bool {
        if !self.locomotion.stand_up_requested() {
            return false;
        }
        if !self.has_headroom(body) {
            debug!("Stand-up deferred: no headroom");
            return false;
        }
        self.locomotion.finish_stand_up();
        body.set_capsule(self.current_capsule());
        debug!("Stood up");
        true
    }

    pub fn start_running(&mut self) -> bool {
        let started = self.locomotion.start_running();
        if started {
            debug!("Start running");
        }
        started
    }

    pub fn stop_running(&mut self) -> bool {
        let stopped = self.locomotion.stop_running();
        if stopped {
            debug!("Stop running");
        }
        stopped
    }

    pub fn pause(&mut self, paused: bool) {
        if self.locomotion.set_paused(paused) {
            warn!("Controller unpaused while frozen; it stays frozen until freeze(false)");
        }
        if paused {
            self.input = Vec2::ZERO;
            self.memory.reset();
        }
    }

    /// Freeze the body in place (kinematic). Implies pause.
    pub fn freeze<B: PhysicsBody + ?Sized>(&mut self, body: &mut B, frozen: bool) {
        self.locomotion.set_frozen(frozen);
        body.set_kinematic(frozen);
        if frozen {
            self.input = Vec2::ZERO;
            self.memory.reset();
        }
        debug!("Frozen: {frozen}");
    }

    /// Dispatch a buffered input action.
    pub fn apply_action<B: PhysicsBody + ?Sized>(
        &mut self,
        body: &mut B,
        action: ControllerAction,
    ) -> bool {
        match action {
            ControllerAction::Jump => self.jump(body),
            ControllerAction::CrouchDown => self.crouch_down(body),
            ControllerAction::CrouchUp => self.crouch_up(),
            ControllerAction::StartRunning => self.start_running(),
            ControllerAction::StopRunning => self.stop_running(),
            ControllerAction::Pause(paused) => {
                self.pause(paused);
                true
            }
            ControllerAction::Freeze(frozen) => {
                self.freeze(body, frozen);
                true
            }
        }
    }

    // --- ticks ---

    /// Fixed-rate update: ground, stand-up, forces, friction, camera target.
    pub fn physics_tick<B: PhysicsBody + ?Sized>(&mut self, body: &mut B, dt: f32) {
        if !self.active || !self.initialized || self.locomotion.is_frozen() {
            return;
        }
        self.tick = self.tick.wrapping_add(1);
        self.ground = self.sensor.sense(body, self.tick);
        if self.jumped && (!self.ground.grounded || body.velocity().y <= 0.0) {
            self.jumped = false;
        }
        self.resolve_stand_up(body);

        if self.locomotion.is_paused() {
            friction::apply(body, &self.ground, false, &self.settings);
        } else {
            let target_speed = self.target_speed();
            integrator::integrate(
                body,
                &mut self.memory,
                &self.settings,
                IntegrationInput {
                    raw_input: self.input,
                    target_speed,
                    ground: self.ground,
                    skip_stick: self.jumped,
                    dt,
                },
            );
        }
        self.rig.set_target(self.eye(body));
    }

    /// Render-rate update: camera follow.
    pub fn tick<B: PhysicsBody + ?Sized>(&mut self, body: &B, dt: f32) {
        if !self.active || !self.initialized {
            return;
        }
        self.rig.follow(
            body.position(),
            body.velocity(),
            self.settings.height,
            &self.settings.camera,
            dt,
        );
    }

    pub fn on_activate<B: PhysicsBody + ?Sized>(&mut self, body: &B) {
        self.active = true;
        self.rig.set_active(true);
        self.rig.set_target(self.eye(body));
        self.rig.snap();
    }

    pub fn on_deactivate(&mut self) {
        self.active = false;
        self.rig.set_active(false);
        self.input = Vec2::ZERO;
    }

    // --- queries ---

    /// Ground state from the last physics tick.
    pub fn is_grounded(&self) -> bool {
        self.ground.grounded
    }

    pub fn ground(&self) -> GroundInfo {
        self.ground
    }

    pub fn is_running(&self) -> bool {
        self.locomotion.is_running()
    }

    pub fn is_crouching(&self) -> bool {
        self.locomotion.is_crouching()
    }

    pub fn target_speed(&self) -> f32 {
        self.locomotion.target_speed(&self.settings)
    }

    /// Horizontal speed of the body.
    pub fn current_speed<B: PhysicsBody + ?Sized>(&self, body: &B) -> f32 {
        let velocity = body.velocity();
        let speed = Vec2::new(velocity.x, velocity.z).length();
        if speed.is_finite() {
            speed
        } else {
            0.0
        }
    }

    pub fn motion_state<B: PhysicsBody + ?Sized>(&self, body: &B) -> MotionState {
        MotionState {
            grounded: self.ground.grounded,
            surface_angle: self.ground.surface_angle,
            speed: self.current_speed(body),
            target_speed: self.target_speed(),
            crouching: self.is_crouching(),
            running: self.is_running(),
            paused: self.locomotion.is_paused(),
            frozen: self.locomotion.is_frozen(),
            standing_up_pending: self.locomotion.stand_up_requested(),
        }
    }

    /// Camera world transform: rig position and body yaw plus pitch.
    pub fn camera_transform<B: PhysicsBody + ?Sized>(&self, body: &B) -> Transform {
        Transform::from_translation(self.rig.position())
            .with_rotation(self.rig.rotation(body.rotation()))
    }

    // --- helpers ---

    fn standing_capsule(&self) -> CapsuleShape {
        CapsuleShape {
            radius: self.settings.radius,
            height: self.settings.height,
        }
    }

    fn current_capsule(&self) -> CapsuleShape {
        CapsuleShape {
            radius: self.settings.radius,
            height: self.locomotion.collider_height(&self.settings),
        }
    }

    fn eye<B: PhysicsBody + ?Sized>(&self, body: &B) -> Vec3 {
        eye_position(
            body.position(),
            self.locomotion.collider_height(&self.settings),
            &self.settings.camera,
        )
    }

    /// Sweep the crouched upper hemisphere up to where the standing one would sit.
    fn has_headroom<B: PhysicsBody + ?Sized>(&self, body: &B) -> bool {
        let radius = self.settings.radius;
        let crouch_height = self.settings.crouch_height();
        let origin = body.position() + Vec3::Y * (crouch_height - radius);
        let distance = self.settings.height - crouch_height + STAND_UP_MARGIN;
        body.sphere_cast(origin, radius * PROBE_RADIUS_SCALE, Dir3::Y, distance)
            .is_none()
    }
}

/// A controller bound to the physics body it drives.
#[derive(Debug)]
pub struct BoundController<P: PhysicsBody> {
    controller: FirstPersonController,
    body: P,
}

impl<P: PhysicsBody> BoundController<P> {
    /// Validate settings, configure `body` and run init.
    pub fn new(settings: Arc<MovementSettings>, mut body: P) -> Result<Self, ControllerError> {
        let mut controller = FirstPersonController::new(settings)?;
        controller.init(&mut body)?;
        Ok(Self { controller, body })
    }

    pub fn controller(&self) -> &FirstPersonController {
        &self.controller
    }

    pub fn body(&self) -> &P {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut P {
        &mut self.body
    }

    pub fn into_parts(self) -> (FirstPersonController, P) {
        (self.controller, self.body)
    }

    pub fn set_settings(&mut self, settings: Arc<MovementSettings>) -> Result<(), ControllerError> {
        self.controller.set_settings(settings, &mut self.body)
    }

    pub fn move_axes(&mut self, horizontal: f32, vertical: f32, clamp: bool) {
        self.controller.move_axes(horizontal, vertical, clamp);
    }

    pub fn look(&mut self, horizontal: f32, vertical: f32) {
        self.controller.look(&mut self.body, horizontal, vertical);
    }

    pub fn jump(&mut self) -> bool {
        self.controller.jump(&mut self.body)
    }

    pub fn crouch_down(&mut self) -> bool {
        self.controller.crouch_down(&mut self.body)
    }

    pub fn crouch_up(&mut self) -> bool {
        self.controller.crouch_up()
    }

    pub fn start_running(&mut self) -> bool {
        self.controller.start_running()
    }

    pub fn stop_running(&mut self) -> bool {
        self.controller.stop_running()
    }

    pub fn pause(&mut self, paused: bool) {
        self.controller.pause(paused);
    }

    pub fn freeze(&mut self, frozen: bool) {
        self.controller.freeze(&mut self.body, frozen);
    }

    pub fn apply_action(&mut self, action: ControllerAction) -> bool {
        self.controller.apply_action(&mut self.body, action)
    }

    pub fn physics_tick(&mut self, dt: f32) {
        self.controller.physics_tick(&mut self.body, dt);
    }

    pub fn tick(&mut self, dt: f32) {
        self.controller.tick(&self.body, dt);
    }

    pub fn on_activate(&mut self) {
        self.controller.on_activate(&self.body);
    }

    pub fn on_deactivate(&mut self) {
        self.controller.on_deactivate();
    }

    pub fn is_grounded(&self) -> bool {
        self.controller.is_grounded()
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    pub fn is_crouching(&self) -> bool {
        self.controller.is_crouching()
    }

    pub fn current_speed(&self) -> f32 {
        self.controller.current_speed(&self.body)
    }

    pub fn target_speed(&self) -> f32 {
        self.controller.target_speed()
    }

    pub fn motion_state(&self) -> MotionState {
        self.controller.motion_state(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::FrictionCombine;
    use crate::sandbox::{SandboxBody, SandboxWorld, Surface};

    const DT: f32 = 1.0 / 50.0;

    fn settings() -> Arc<MovementSettings> {
        Arc::new(MovementSettings::default())
    }

    fn spawn(world: SandboxWorld, position: Vec3) -> BoundController<SandboxBody> {
        let body = SandboxBody::new(Arc::new(world), position);
        BoundController::new(settings(), body).expect("controller init")
    }

    fn flat(position: Vec3) -> BoundController<SandboxBody> {
        spawn(SandboxWorld::new().with_surface(Surface::ground(0.0)), position)
    }

    fn step(controller: &mut BoundController<SandboxBody>) {
        controller.physics_tick(DT);
        controller.body_mut().step(DT);
    }

    #[test]
    fn test_walk_reaches_exact_target_speed() {
        let mut controller = flat(Vec3::ZERO);
        controller.move_axes(0.0, 1.0, true);

        for _ in 0..10 {
            step(&mut controller);
        }
        assert!((controller.current_speed() - 5.0).abs() < 0.01);

        for _ in 0..20 {
            step(&mut controller);
        }
        assert!((controller.current_speed() - 5.0).abs() < 0.01);
        assert!(controller.is_grounded());
        // Forward is -Z.
        assert!(controller.body().position().z < -2.0);
    }

    #[test]
    fn test_run_speed() {
        let mut controller = flat(Vec3::ZERO);
        assert!(controller.start_running());
        controller.move_axes(0.0, 1.0, true);
        for _ in 0..10 {
            step(&mut controller);
        }
        assert!((controller.current_speed() - 6.5).abs() < 0.01);
    }

    #[test]
    fn test_idle_switches_to_grip_and_does_not_drift() {
        let mut controller = flat(Vec3::ZERO);
        step(&mut controller);

        let friction = controller.body().friction();
        assert_eq!(friction.coefficient, 20.0);
        assert_eq!(friction.combine, FrictionCombine::Max);

        for _ in 0..50 {
            step(&mut controller);
        }
        let position = controller.body().position();
        assert!(Vec2::new(position.x, position.z).length() < 1e-4);
        assert!(controller.current_speed() < 1e-4);
    }

    #[test]
    fn test_release_brakes_immediately() {
        let mut controller = flat(Vec3::ZERO);
        controller.move_axes(1.0, 0.0, true);
        for _ in 0..5 {
            step(&mut controller);
        }
        controller.move_axes(0.0, 0.0, true);
        step(&mut controller);
        assert!(controller.current_speed() < 1e-4);
    }

    #[test]
    fn test_idle_on_slope_holds_position() {
        let world = SandboxWorld::new().with_surface(Surface::slope(Vec3::ZERO, 30.0));
        let mut controller = spawn(world, Vec3::ZERO);
        // First contact lifts the capsule out of the slope.
        for _ in 0..5 {
            step(&mut controller);
        }
        let settled = controller.body().position();
        for _ in 0..50 {
            step(&mut controller);
        }
        assert!(controller.is_grounded());
        assert_eq!(controller.motion_state().surface_angle, 30.0);
        assert!(controller.body().position().distance(settled) < 0.01);
    }

    #[test]
    fn test_jump_when_grounded() {
        let mut controller = flat(Vec3::ZERO);
        step(&mut controller);

        assert!(controller.jump());
        assert!((controller.body().velocity().y - 5.0).abs() < 1e-5);

        // The tick right after the jump must not cancel it.
        controller.physics_tick(DT);
        assert!((controller.body().velocity().y - 5.0).abs() < 1e-5);
        controller.body_mut().step(DT);

        for _ in 0..5 {
            step(&mut controller);
        }
        assert!(!controller.is_grounded());
        assert!(controller.body().position().y > 0.3);
    }

    fn apex_after_jump(settings: MovementSettings, dt: f32, ticks: usize) -> f32 {
        let body = SandboxBody::new(
            Arc::new(SandboxWorld::new().with_surface(Surface::ground(0.0))),
            Vec3::ZERO,
        );
        let mut controller =
            BoundController::new(Arc::new(settings), body).expect("controller init");
        controller.physics_tick(dt);
        controller.body_mut().step(dt);
        assert!(controller.jump());

        let mut apex: f32 = 0.0;
        for _ in 0..ticks {
            controller.physics_tick(dt);
            controller.body_mut().step(dt);
            apex = apex.max(controller.body().position().y);
        }
        apex
    }

    #[test]
    fn test_small_jump_survives_ground_stick() {
        let settings = MovementSettings {
            jump_impulse: 2.0,
            ..MovementSettings::default()
        };
        // Ballistic apex is 0.204 m; still inside the probe range on the first ticks.
        let apex = apex_after_jump(settings, DT, 20);
        assert!(apex > 0.15, "apex {apex}");
    }

    #[test]
    fn test_jump_at_high_tick_rate() {
        // 5 m/s at 120 Hz: ballistic apex 1.27 m.
        let apex = apex_after_jump(MovementSettings::default(), 1.0 / 120.0, 90);
        assert!(apex > 1.1, "apex {apex}");
    }

    #[test]
    fn test_jump_while_airborne_is_rejected() {
        let mut controller = flat(Vec3::new(0.0, 3.0, 0.0));
        step(&mut controller);
        let vertical = controller.body().velocity().y;

        assert!(!controller.jump());
        assert_eq!(controller.body().velocity().y, vertical);
    }

    #[test]
    fn test_air_control_limits_new_input() {
        let mut controller = flat(Vec3::ZERO);
        controller.move_axes(0.0, 1.0, true);
        for _ in 0..5 {
            step(&mut controller);
        }
        assert!(controller.jump());
        step(&mut controller);
        step(&mut controller);
        assert!(!controller.is_grounded());

        // Hard strafe in the air: each tick adds at most half the scaled input.
        controller.move_axes(1.0, 1.0, true);
        let limit = 0.5 * controller.target_speed();
        let mut previous = controller.controller().memory().previous_force;
        for _ in 0..5 {
            step(&mut controller);
            let force = controller.controller().memory().previous_force;
            assert!((force.x - previous.x).abs() <= limit + 1e-4);
            assert!((force.y - previous.y).abs() <= limit + 1e-4);
            previous = force;
        }
    }

    #[test]
    fn test_air_control_without_input_keeps_momentum() {
        let mut controller = flat(Vec3::ZERO);
        controller.move_axes(0.0, 1.0, true);
        for _ in 0..5 {
            step(&mut controller);
        }
        assert!(controller.jump());
        step(&mut controller);
        controller.move_axes(0.0, 0.0, true);
        step(&mut controller);
        step(&mut controller);

        // Decaying, not braking.
        let speed = controller.current_speed();
        assert!(speed > 4.0 && speed < 5.0, "speed {speed}");
    }

    #[test]
    fn test_input_clamp() {
        let mut controller = flat(Vec3::ZERO);
        controller.move_axes(3.0, -2.0, true);
        assert_eq!(controller.controller().input(), Vec2::new(1.0, -1.0));

        controller.move_axes(3.0, -2.0, false);
        assert_eq!(controller.controller().input(), Vec2::new(3.0, -2.0));

        controller.move_axes(f32::NAN, 1.0, true);
        assert_eq!(controller.controller().input(), Vec2::ZERO);
    }

    #[test]
    fn test_crouch_rejected_while_running() {
        let mut controller = flat(Vec3::ZERO);
        controller.start_running();

        assert!(!controller.crouch_down());
        assert!(controller.is_running());
        assert!(!controller.is_crouching());
        assert_eq!(controller.body().capsule().height, 1.75);
    }

    #[test]
    fn test_crouch_shrinks_capsule_and_slows() {
        let mut controller = flat(Vec3::ZERO);
        assert!(controller.crouch_down());
        assert_eq!(controller.body().capsule().height, 0.875);
        assert!((controller.target_speed() - 3.0).abs() < 1e-5);

        controller.crouch_up();
        step(&mut controller);
        assert!(!controller.is_crouching());
        assert_eq!(controller.body().capsule().height, 1.75);
    }

    #[test]
    fn test_stand_up_waits_for_headroom() {
        // 1.2m ceiling over a 2x2m patch around the origin.
        let ceiling = Surface::ceiling(1.2).with_bounds(Rect::new(-1.0, -1.0, 1.0, 1.0));
        let world = SandboxWorld::new()
            .with_surface(Surface::ground(0.0))
            .with_surface(ceiling);
        let mut controller = spawn(world, Vec3::new(0.0, 0.0, 5.0));

        assert!(controller.crouch_down());
        controller.body_mut().teleport(Vec3::ZERO);
        assert!(controller.crouch_up());

        for _ in 0..10 {
            step(&mut controller);
        }
        assert!(controller.is_crouching());
        assert!(controller.motion_state().standing_up_pending);

        controller.body_mut().teleport(Vec3::new(0.0, 0.0, 5.0));
        step(&mut controller);
        assert!(!controller.is_crouching());
        assert!(!controller.motion_state().standing_up_pending);
    }

    #[test]
    fn test_look_turns_body_and_clamps_pitch() {
        let mut controller = flat(Vec3::ZERO);
        controller.look(90.0, 120.0);

        let forward = controller.body().rotation() * Vec3::NEG_Z;
        assert!((forward - Vec3::X).length() < 1e-5);
        assert_eq!(controller.controller().camera().pitch(), 90.0);
    }

    #[test]
    fn test_pause_ignores_input_and_clears_memory() {
        let mut controller = flat(Vec3::ZERO);
        controller.move_axes(0.0, 1.0, true);
        step(&mut controller);

        controller.pause(true);
        assert_eq!(controller.controller().input(), Vec2::ZERO);
        assert_eq!(*controller.controller().memory(), MotionMemory::default());

        controller.move_axes(0.0, 1.0, true);
        controller.look(45.0, 10.0);
        assert_eq!(controller.controller().input(), Vec2::ZERO);
        assert_eq!(controller.body().rotation(), Quat::IDENTITY);
        assert!(!controller.jump());
        assert!(!controller.start_running());
    }

    #[test]
    fn test_freeze_makes_body_kinematic() {
        let mut controller = flat(Vec3::new(0.0, 2.0, 0.0));
        controller.freeze(true);

        assert!(controller.body().is_kinematic());
        assert!(controller.motion_state().paused);
        for _ in 0..10 {
            step(&mut controller);
        }
        assert_eq!(controller.body().position(), Vec3::new(0.0, 2.0, 0.0));

        controller.freeze(false);
        assert!(!controller.body().is_kinematic());
        assert!(!controller.motion_state().paused);
    }

    #[test]
    fn test_unpause_while_frozen_keeps_frozen() {
        let mut controller = flat(Vec3::ZERO);
        controller.freeze(true);
        controller.pause(false);

        let state = controller.motion_state();
        assert!(!state.paused);
        assert!(state.frozen);
        assert!(controller.body().is_kinematic());
    }

    #[test]
    fn test_missing_body_fails_init() {
        let result = BoundController::new(settings(), SandboxBody::detached(Vec3::ZERO));
        assert!(matches!(
            result,
            Err(ControllerError::MissingComponent(_))
        ));
    }

    #[test]
    fn test_invalid_settings_fail_construction() {
        let bad = Arc::new(MovementSettings {
            radius: -1.0,
            ..Default::default()
        });
        assert!(matches!(
            FirstPersonController::new(bad),
            Err(ControllerError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_settings_hot_swap_resizes_capsule() {
        let mut controller = flat(Vec3::ZERO);
        controller.crouch_down();
        let taller = Arc::new(MovementSettings {
            height: 2.0,
            ..Default::default()
        });
        controller.set_settings(taller).expect("valid settings");
        assert_eq!(controller.body().capsule().height, 1.0);
    }

    #[test]
    fn test_deactivated_controller_does_nothing() {
        let mut controller = flat(Vec3::ZERO);
        controller.move_axes(0.0, 1.0, true);
        controller.on_deactivate();
        for _ in 0..5 {
            step(&mut controller);
        }
        assert!(controller.current_speed() < 1e-4);
        assert_eq!(controller.controller().physics_ticks(), 0);

        controller.on_activate();
        controller.move_axes(0.0, 1.0, true);
        step(&mut controller);
        assert!((controller.current_speed() - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_camera_follows_eye() {
        let mut controller = flat(Vec3::ZERO);
        step(&mut controller);
        controller.tick(1.0 / 60.0);

        let eye = controller.controller().camera().position();
        assert!((eye - Vec3::new(0.0, 1.65, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_apply_action_dispatch() {
        let mut controller = flat(Vec3::ZERO);
        assert!(controller.apply_action(ControllerAction::StartRunning));
        assert!(controller.is_running());
        assert!(controller.apply_action(ControllerAction::StopRunning));
        assert!(controller.apply_action(ControllerAction::CrouchDown));
        assert!(controller.is_crouching());
        assert!(controller.apply_action(ControllerAction::Pause(true)));
        assert!(controller.motion_state().paused);
    }
}
