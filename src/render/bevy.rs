// Bevy-specific rendering code: the interactive viewer and type conversions

use bevy::prelude::*;
use bevy::text::{Justify, TextSpan as BevyTextSpan};
use bevy::window::WindowResolution;
use log::{debug, info};

use super::presenter::PresenterView;
use super::resolved::{CodeToken, ResolvedBlock, ResolvedFrame};
use super::resolver::{resolve_frame, ResolveConfig};
use super::types::{RenderColor, RenderDimensions, TextAlign, TextPosition};
use crate::config::Config;
use crate::content::Deck;
use crate::error::Result;
use crate::nav::{Move, Navigator};

/// Convert RenderColor to Bevy Color
impl From<RenderColor> for Color {
    fn from(color: RenderColor) -> Self {
        Color::srgba(color.r, color.g, color.b, color.a)
    }
}

impl From<&RenderColor> for Color {
    fn from(color: &RenderColor) -> Self {
        Color::srgba(color.r, color.g, color.b, color.a)
    }
}

/// Extension trait for TextPosition to place the slide column
pub trait TextPositionExt {
    /// Main-axis placement of a vertical flex column
    fn to_column_justify(&self) -> JustifyContent;
}

impl TextPositionExt for TextPosition {
    fn to_column_justify(&self) -> JustifyContent {
        match self {
            TextPosition::Top => JustifyContent::FlexStart,
            TextPosition::Center => JustifyContent::Center,
            TextPosition::Bottom => JustifyContent::FlexEnd,
        }
    }
}

/// Extension trait for TextAlign to get Bevy text justification
pub trait TextAlignExt {
    fn to_bevy_justify(&self) -> Justify;
    fn to_align_items(&self) -> AlignItems;
}

impl TextAlignExt for TextAlign {
    fn to_bevy_justify(&self) -> Justify {
        match self {
            TextAlign::Left => Justify::Left,
            TextAlign::Center => Justify::Center,
            TextAlign::Right => Justify::Right,
        }
    }

    fn to_align_items(&self) -> AlignItems {
        match self {
            TextAlign::Left => AlignItems::FlexStart,
            TextAlign::Center => AlignItems::Center,
            TextAlign::Right => AlignItems::FlexEnd,
        }
    }
}

/// Navigation requested from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Advance,
    Retreat,
    Right,
    Left,
    Down,
    Up,
    First,
    Last,
}

impl Action {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Space | KeyCode::Enter | KeyCode::PageDown | KeyCode::KeyN => {
                Some(Action::Advance)
            }
            KeyCode::Backspace | KeyCode::PageUp | KeyCode::KeyP => Some(Action::Retreat),
            KeyCode::ArrowRight => Some(Action::Right),
            KeyCode::ArrowLeft => Some(Action::Left),
            KeyCode::ArrowDown => Some(Action::Down),
            KeyCode::ArrowUp => Some(Action::Up),
            KeyCode::Home => Some(Action::First),
            KeyCode::End => Some(Action::Last),
            _ => None,
        }
    }

    pub fn apply(self, navigator: &mut Navigator) -> Move {
        match self {
            Action::Advance => navigator.advance(),
            Action::Retreat => navigator.retreat(),
            Action::Right => navigator.right(),
            Action::Left => navigator.left(),
            Action::Down => navigator.down(),
            Action::Up => navigator.up(),
            Action::First => navigator.first(),
            Action::Last => navigator.last(),
        }
    }
}

/// Deck state shared by the viewer systems
#[derive(Resource)]
pub struct Presentation {
    pub deck: Deck,
    pub navigator: Navigator,
    pub resolve: ResolveConfig,
    /// Set when the visible frame must be rebuilt
    pub dirty: bool,
}

// Component markers for Bevy ECS
#[derive(Component)]
pub struct SlideRoot;

/// Open a window and present `deck` until it is closed
pub fn run_viewer(deck: Deck, config: &Config) -> Result<()> {
    let resolve = ResolveConfig::from_config(config)?;
    let navigator = Navigator::new(&deck);
    let asset_dir = resolve.asset_dir.to_string_lossy().into_owned();
    info!(
        "Presenting {} slides ({} fragments on the first)",
        navigator.top_level_count(),
        navigator.fragment_total()
    );

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: config.window.title.clone(),
                        resolution: WindowResolution::new(config.window.width, config.window.height),
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    file_path: asset_dir,
                    ..default()
                }),
        )
        .insert_resource(ClearColor(resolve.theme.background.into()))
        .insert_resource(Presentation {
            deck,
            navigator,
            resolve,
            dirty: true,
        })
        .add_systems(Startup, setup_camera)
        .add_systems(Update, (handle_input, redraw).chain())
        .run();

    Ok(())
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn handle_input(keys: Res<ButtonInput<KeyCode>>, mut presentation: ResMut<Presentation>) {
    for key in keys.get_just_pressed() {
        let Some(action) = Action::from_key(*key) else {
            continue;
        };
        let moved = action.apply(&mut presentation.navigator);
        debug!("{:?} -> {:?}", action, moved);
        if moved.changed() {
            presentation.dirty = true;
        }
    }
}

fn redraw(
    mut commands: Commands,
    mut presentation: ResMut<Presentation>,
    mut clear_color: ResMut<ClearColor>,
    asset_server: Res<AssetServer>,
    roots: Query<Entity, With<SlideRoot>>,
) {
    if !presentation.dirty {
        return;
    }
    presentation.dirty = false;

    for entity in &roots {
        commands.entity(entity).despawn();
    }

    let position = presentation.navigator.position();
    let Some(frame) = resolve_frame(&presentation.deck, position, &presentation.resolve) else {
        return;
    };

    // Speaker notes go to the terminal only
    if let Some(view) = PresenterView::new(&presentation.deck, position) {
        print!("{}", view);
    }

    clear_color.0 = frame.background.into();
    spawn_frame(&mut commands, &frame, &asset_server);
}

fn spawn_frame(commands: &mut Commands, frame: &ResolvedFrame, asset_server: &AssetServer) {
    let justify = frame.text_align.to_bevy_justify();

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: frame.text_position.to_column_justify(),
                align_items: frame.text_align.to_align_items(),
                padding: UiRect::all(Val::Percent(RenderDimensions::PADDING * 100.0)),
                row_gap: Val::Px(14.0),
                ..default()
            },
            SlideRoot,
        ))
        .with_children(|column| {
            for block in &frame.blocks {
                match block {
                    ResolvedBlock::Text { spans, indent } => {
                        column
                            .spawn((
                                Text::default(),
                                TextLayout::new_with_justify(justify),
                                Node {
                                    margin: UiRect::left(Val::Px(*indent as f32 * 28.0)),
                                    ..default()
                                },
                            ))
                            .with_children(|text| {
                                for span in spans {
                                    text.spawn((
                                        BevyTextSpan::new(span.text.clone()),
                                        TextFont {
                                            font_size: span.font_size,
                                            ..default()
                                        },
                                        TextColor(span.color.into()),
                                    ));
                                }
                            });
                    }
                    ResolvedBlock::Code {
                        lines,
                        font_size,
                        background,
                        ..
                    } => {
                        column
                            .spawn((
                                Node {
                                    width: Val::Percent(100.0),
                                    padding: UiRect::all(Val::Px(10.0)),
                                    ..default()
                                },
                                BackgroundColor(background.into()),
                            ))
                            .with_children(|code| {
                                code.spawn((Text::default(), TextLayout::new_with_justify(Justify::Left)))
                                    .with_children(|text| {
                                        for (run, color) in code_runs(lines) {
                                            text.spawn((
                                                BevyTextSpan::new(run),
                                                TextFont {
                                                    font_size: *font_size,
                                                    ..default()
                                                },
                                                TextColor(color.into()),
                                            ));
                                        }
                                    });
                            });
                    }
                    ResolvedBlock::Image {
                        src,
                        proportion,
                        exists: true,
                        ..
                    } => {
                        let width = proportion.map_or(Val::Auto, |p| Val::Percent(p * 100.0));
                        column.spawn((
                            ImageNode::new(asset_server.load(src.clone())),
                            Node {
                                width,
                                max_height: Val::Percent(100.0),
                                ..default()
                            },
                        ));
                    }
                    ResolvedBlock::Image { src, .. } => {
                        column.spawn((
                            Text::new(format!("[image: {}]", src)),
                            TextFont {
                                font_size: 18.0,
                                ..default()
                            },
                            TextColor(Color::srgb(0.6, 0.6, 0.6)),
                        ));
                    }
                }
            }
        });
}

/// Text runs for a highlighted code block, with line breaks carried by the
/// first run of each following line
pub fn code_runs(lines: &[Vec<CodeToken>]) -> Vec<(String, RenderColor)> {
    let mut runs = Vec::new();
    for (i, tokens) in lines.iter().enumerate() {
        let mut prefix = if i == 0 { "" } else { "\n" };
        for token in tokens {
            runs.push((format!("{}{}", prefix, token.text), token.color));
            prefix = "";
        }
        if !prefix.is_empty() {
            runs.push((prefix.to_string(), RenderColor::white()));
        }
    }
    runs
}
