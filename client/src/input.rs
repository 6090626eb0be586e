//! Keyboard and mouse to controller input.
//!
//! WASD move, Shift runs, Ctrl crouches, Space jumps, P pauses, F freezes.
//! Mouse look only applies while the cursor is locked; click to lock, Esc to release.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};
use fp_controller::prelude::*;

use crate::player::Player;

/// Degrees of look per pixel of mouse travel.
pub const MOUSE_SENSITIVITY: f32 = 0.2;

/// Device toggles that are not movement state.
#[derive(Resource, Default)]
pub struct InputToggles {
    paused: bool,
    frozen: bool,
}

/// Movement axes from held keys: x = strafe right, y = forward.
pub fn movement_axes(keyboard: &ButtonInput<KeyCode>) -> Vec2 {
    let mut axes = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        axes.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        axes.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        axes.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        axes.x -= 1.0;
    }
    axes
}

const RUN_KEYS: [KeyCode; 2] = [KeyCode::ShiftLeft, KeyCode::ShiftRight];
const CROUCH_KEYS: [KeyCode; 2] = [KeyCode::ControlLeft, KeyCode::ControlRight];

/// Edge-triggered actions for this frame.
pub fn key_actions(
    keyboard: &ButtonInput<KeyCode>,
    toggles: &mut InputToggles,
) -> Vec<ControllerAction> {
    let mut actions = Vec::new();
    if keyboard.just_pressed(KeyCode::Space) {
        actions.push(ControllerAction::Jump);
    }
    if keyboard.any_just_pressed(CROUCH_KEYS) {
        actions.push(ControllerAction::CrouchDown);
    }
    if keyboard.any_just_released(CROUCH_KEYS) {
        actions.push(ControllerAction::CrouchUp);
    }
    if keyboard.any_just_pressed(RUN_KEYS) {
        actions.push(ControllerAction::StartRunning);
    }
    if keyboard.any_just_released(RUN_KEYS) {
        actions.push(ControllerAction::StopRunning);
    }
    if keyboard.just_pressed(KeyCode::KeyP) {
        toggles.paused = !toggles.paused;
        actions.push(ControllerAction::Pause(toggles.paused));
    }
    if keyboard.just_pressed(KeyCode::KeyF) {
        toggles.frozen = !toggles.frozen;
        actions.push(ControllerAction::Freeze(toggles.frozen));
    }
    actions
}

/// Buffer this frame's keyboard state into the player's input.
///
/// Runs in `Update`; the fixed tick drains actions, so presses between ticks are kept.
pub fn handle_keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut toggles: ResMut<InputToggles>,
    mut players: Query<&mut ControllerInput, With<Player>>,
) {
    let axes = movement_axes(&keyboard);
    let actions = key_actions(&keyboard, &mut toggles);
    for mut input in players.iter_mut() {
        input.axes = axes;
        for action in actions.iter().copied() {
            input.push(action);
        }
    }
}

/// Mouse motion becomes look degrees while the cursor is locked.
pub fn handle_mouse_input(
    mut mouse_motion: MessageReader<MouseMotion>,
    windows: Query<&CursorOptions, With<PrimaryWindow>>,
    mut players: Query<&mut ControllerInput, With<Player>>,
) {
    let mut delta = Vec2::ZERO;
    for motion in mouse_motion.read() {
        delta += motion.delta;
    }

    let locked = windows
        .single()
        .is_ok_and(|cursor| cursor.grab_mode != CursorGrabMode::None);
    if delta == Vec2::ZERO || !locked {
        return;
    }

    // Screen y grows downward; looking up is positive pitch.
    let look = Vec2::new(delta.x, -delta.y) * MOUSE_SENSITIVITY;
    for mut input in players.iter_mut() {
        input.add_look(look);
    }
}

/// Left click grabs the cursor, Esc lets it go.
pub fn grab_cursor(
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut cursor_opts: Query<&mut CursorOptions, With<PrimaryWindow>>,
) {
    let Ok(mut cursor) = cursor_opts.single_mut() else {
        return;
    };
    if mouse_button.just_pressed(MouseButton::Left) {
        cursor.grab_mode = CursorGrabMode::Locked;
        cursor.visible = false;
    } else if keyboard.just_pressed(KeyCode::Escape) {
        cursor.grab_mode = CursorGrabMode::None;
        cursor.visible = true;
    }
}
