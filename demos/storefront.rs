//! A small storefront scene showing the steps needed to get started with the plugin.

use bevy::prelude::*;
use bevy_storefront_cam::prelude::*;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            DefaultStorefrontCamPlugins, // Step 1: Add camera controller plugins
        ))
        .add_systems(Startup, (setup_camera, setup_scene, setup_ui))
        .add_systems(Update, (arrive, pick_anchor, update_hud))
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        StorefrontCam::default(), // Step 2: add camera controller component to any cameras
    ));
}

/// Step 3: tell the controller when the visitor has arrived.
fn arrive(keys: Res<ButtonInput<KeyCode>>, mut phase: ResMut<ScenePhase>) {
    if keys.just_pressed(KeyCode::Space) {
        *phase = match *phase {
            ScenePhase::PreArrival => ScenePhase::Arrived,
            ScenePhase::Arrived => ScenePhase::PreArrival,
        };
    }
}

/// Step 4: request moves between anchors.
fn pick_anchor(
    keys: Res<ButtonInput<KeyCode>>,
    cameras: Query<&StorefrontCam>,
    mut go_to: EventWriter<GoToAnchor>,
) {
    const KEYS: [KeyCode; 6] = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
    ];
    let Ok(cam) = cameras.single() else {
        return;
    };
    for (key, anchor) in KEYS.iter().zip(cam.anchors().iter()) {
        if keys.just_pressed(*key) {
            go_to.write(GoToAnchor::all(anchor.id.clone()));
        }
    }
}

//
// --- The below code is not important for the example ---
//

#[derive(Component)]
struct Hud;

fn update_hud(cameras: Query<&StorefrontCam>, mut hud: Query<&mut Text, With<Hud>>) {
    let (Ok(cam), Ok(mut text)) = (cameras.single(), hud.single_mut()) else {
        return;
    };
    let anchors: String = cam
        .anchors()
        .iter()
        .enumerate()
        .map(|(i, anchor)| format!("{} - {}\n", i + 1, anchor.id))
        .collect();
    *text = Text::new(format!(
        "Space - Arrive / leave\nDrag - Spin (default frame only)\n{anchors}\nPhase: {:?}\nFocus: {}",
        cam.phase(),
        cam.focus().as_str(),
    ));
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(4.0, 2.0, 1.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.8, 0.7, 0.6))),
        Transform::from_xyz(0.0, 0.0, -0.5),
    ));
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(20.0, 20.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.3, 0.3))),
        Transform::from_xyz(0.0, -1.0, 0.0),
    ));
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(3.0, 6.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn setup_ui(mut commands: Commands) {
    commands.spawn((
        Hud,
        Text::default(),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        Node {
            margin: UiRect::all(Val::Px(20.0)),
            ..Default::default()
        },
    ));
}
