//! Keyboard input handling for the TUI.
//!
//! Translates key events into application state changes. Field editing is
//! append/delete at the end of the value; clearing a field or toggling
//! password visibility leaves the cursor at the end of the (new) text.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{
    can_add_email_char, can_add_password_char, can_add_text_char, App, AppState, EditFocus,
    LoginFocus, Screen, SignupFocus, MAX_ABOUT_LENGTH, MAX_BIRTH_LENGTH, MAX_NAME_LENGTH,
};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle edit dialog
    if matches!(app.state, AppState::Editing) {
        handle_edit_input(app, key);
        return Ok(false);
    }

    match app.screen {
        Screen::Login => handle_login_input(app, key),
        Screen::Signup => handle_signup_input(app, key),
        Screen::Profile => handle_profile_input(app, key),
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => app.navigate(Screen::Signup),
            KeyCode::Char('u') => match app.login_focus {
                LoginFocus::Email => app.login_email.clear(),
                LoginFocus::Password => app.login_password.clear(),
                LoginFocus::Button => {}
            },
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            // Quit from the login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::F(2) => {
            app.login_show_password = !app.login_show_password;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password => app.login_focus = LoginFocus::Button,
            LoginFocus::Button => app.attempt_login(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.chars().count(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_signup_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('u') {
            match app.signup_focus {
                SignupFocus::Email => app.signup_email.clear(),
                SignupFocus::Password => app.signup_password.clear(),
                SignupFocus::Confirm => app.signup_confirm.clear(),
                SignupFocus::Button => {}
            }
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            app.navigate(Screen::Login);
        }
        KeyCode::F(2) => {
            app.signup_show_password = !app.signup_show_password;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.signup_focus = match app.signup_focus {
                SignupFocus::Email => SignupFocus::Password,
                SignupFocus::Password => SignupFocus::Confirm,
                SignupFocus::Confirm => SignupFocus::Button,
                SignupFocus::Button => SignupFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.signup_focus = match app.signup_focus {
                SignupFocus::Email => SignupFocus::Button,
                SignupFocus::Password => SignupFocus::Email,
                SignupFocus::Confirm => SignupFocus::Password,
                SignupFocus::Button => SignupFocus::Confirm,
            };
        }
        KeyCode::Enter => match app.signup_focus {
            SignupFocus::Email => app.signup_focus = SignupFocus::Password,
            SignupFocus::Password => app.signup_focus = SignupFocus::Confirm,
            SignupFocus::Confirm => app.signup_focus = SignupFocus::Button,
            SignupFocus::Button => app.attempt_signup(),
        },
        KeyCode::Backspace => match app.signup_focus {
            SignupFocus::Email => {
                app.signup_email.pop();
            }
            SignupFocus::Password => {
                app.signup_password.pop();
            }
            SignupFocus::Confirm => {
                app.signup_confirm.pop();
            }
            SignupFocus::Button => {}
        },
        KeyCode::Char(c) => match app.signup_focus {
            SignupFocus::Email => {
                if can_add_email_char(app.signup_email.chars().count(), c) {
                    app.signup_email.push(c);
                }
            }
            SignupFocus::Password => {
                if can_add_password_char(app.signup_password.chars().count(), c) {
                    app.signup_password.push(c);
                }
            }
            SignupFocus::Confirm => {
                if can_add_password_char(app.signup_confirm.chars().count(), c) {
                    app.signup_confirm.push(c);
                }
            }
            SignupFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_profile_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('e') => {
            if !app.busy && !app.profile_loading {
                app.open_edit_dialog();
            }
        }
        KeyCode::Char('r') => {
            app.refresh_profile();
        }
        KeyCode::Char('l') => {
            app.logout();
        }
        _ => {}
    }
    Ok(false)
}

fn handle_edit_input(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('u') {
            match app.edit_focus {
                EditFocus::Name => app.edit_name.clear(),
                EditFocus::Birth => app.edit_birth.clear(),
                EditFocus::About => app.edit_about.clear(),
                EditFocus::Confirm | EditFocus::Cancel => {}
            }
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Down | KeyCode::Tab => {
            app.edit_focus = match app.edit_focus {
                EditFocus::Name => EditFocus::Birth,
                EditFocus::Birth => EditFocus::About,
                EditFocus::About => EditFocus::Confirm,
                EditFocus::Confirm => EditFocus::Cancel,
                EditFocus::Cancel => EditFocus::Name,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.edit_focus = match app.edit_focus {
                EditFocus::Name => EditFocus::Cancel,
                EditFocus::Birth => EditFocus::Name,
                EditFocus::About => EditFocus::Birth,
                EditFocus::Confirm => EditFocus::About,
                EditFocus::Cancel => EditFocus::Confirm,
            };
        }
        KeyCode::Enter => match app.edit_focus {
            EditFocus::Name => app.edit_focus = EditFocus::Birth,
            EditFocus::Birth => app.edit_focus = EditFocus::About,
            EditFocus::About => app.edit_focus = EditFocus::Confirm,
            EditFocus::Confirm => app.submit_edit(),
            EditFocus::Cancel => app.cancel_edit(),
        },
        KeyCode::Backspace => match app.edit_focus {
            EditFocus::Name => {
                app.edit_name.pop();
            }
            EditFocus::Birth => {
                app.edit_birth.pop();
            }
            EditFocus::About => {
                app.edit_about.pop();
            }
            EditFocus::Confirm | EditFocus::Cancel => {}
        },
        KeyCode::Char(c) => match app.edit_focus {
            EditFocus::Name => {
                if can_add_text_char(app.edit_name.chars().count(), c, MAX_NAME_LENGTH) {
                    app.edit_name.push(c);
                }
            }
            EditFocus::Birth => {
                if can_add_text_char(app.edit_birth.chars().count(), c, MAX_BIRTH_LENGTH) {
                    app.edit_birth.push(c);
                }
            }
            EditFocus::About => {
                if can_add_text_char(app.edit_about.chars().count(), c, MAX_ABOUT_LENGTH) {
                    app.edit_about.push(c);
                }
            }
            EditFocus::Confirm | EditFocus::Cancel => {}
        },
        _ => {}
    }
}
